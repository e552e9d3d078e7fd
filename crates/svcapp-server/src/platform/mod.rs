#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::run;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::run;
