//! Permission bits used in section entries.

/// Regular file, `rw-r--r--`.
pub const REGULAR: u32 = 0o644;

/// Executable file, `rwxr-xr-x`.
pub const EXECUTABLE: u32 = 0o755;

/// Directory, `rwxr-xr-x`.
pub const DIRECTORY: u32 = 0o755;

/// Render permission bits the way `ls -l` does, e.g. `drwxr-xr-x`.
pub fn mode_string(mode: u32, is_dir: bool) -> String {
    let mut out = String::with_capacity(10);
    out.push(if is_dir { 'd' } else { '-' });
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_common_modes() {
        assert_eq!(mode_string(REGULAR, false), "-rw-r--r--");
        assert_eq!(mode_string(EXECUTABLE, false), "-rwxr-xr-x");
        assert_eq!(mode_string(DIRECTORY, true), "drwxr-xr-x");
    }
}
