use log::info;
use pipe3::pipe3_core::{HexDump, full_mkdir};
use pipe3::util;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

pub fn hexdump(file: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let data = match &file {
        Some(path) => fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().lock().read_to_end(&mut buf)?;
            buf
        }
    };
    info!("Dumping {} bytes", data.len());

    let mut out = io::stdout().lock();
    write_dump(&mut out, &data)?;
    out.flush()?;
    Ok(())
}

fn write_dump(out: &mut impl Write, data: &[u8]) -> io::Result<()> {
    for line in HexDump::new(data) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

pub fn mkdir(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Creating {}", path.display());
    full_mkdir(path)?;
    Ok(())
}

pub fn check_requirements() {
    info!("Checking pipe3 requirements");
    println!("Checking pipe3 requirements...\n");

    for program in ["/bin/sh", "/bin/cat", "/bin/true"] {
        if is_executable(Path::new(program)) {
            println!("[✓] {} is executable", program);
        } else {
            println!("[✗] {} NOT found (used by the test suite)", program);
        }
    }

    match util::open_fds() {
        Ok(fds) => println!("[✓] Descriptor listing available ({} open)", fds.len()),
        Err(e) => println!("[✗] Descriptor listing NOT available: {}", e),
    }

    println!("\nStandard streams:");
    for (fd, name) in [(0, "stdin"), (1, "stdout"), (2, "stderr")] {
        let state = if util::is_open(fd) { "open" } else { "closed" };
        println!("  {}: {}", name, state);
    }
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
