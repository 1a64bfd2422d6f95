//! Process-level descriptor accounting

use std::fs;
use std::io;
use std::os::unix::io::RawFd;

#[cfg(target_os = "linux")]
const FD_DIR: &str = "/proc/self/fd";
#[cfg(not(target_os = "linux"))]
const FD_DIR: &str = "/dev/fd";

/// List the descriptors open in the current process, sorted.
///
/// The descriptor used to read the listing itself is excluded.
pub fn open_fds() -> io::Result<Vec<RawFd>> {
    let entries = fs::read_dir(FD_DIR)?;
    let mut fds: Vec<RawFd> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
        .collect();

    // The listing includes the directory stream's own descriptor, closed by now.
    fds.retain(|&fd| unsafe { libc::fcntl(fd, libc::F_GETFD) } != -1);
    fds.sort_unstable();
    Ok(fds)
}

/// Number of descriptors open in the current process
pub fn open_fd_count() -> io::Result<usize> {
    open_fds().map(|fds| fds.len())
}

/// Check whether `fd` refers to an open descriptor
pub fn is_open(fd: RawFd) -> bool {
    unsafe { libc::fcntl(fd, libc::F_GETFD) != -1 }
}
