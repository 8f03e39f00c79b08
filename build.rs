//! Build script: git hash for the version string, and toolkit checks for the
//! GPU features before whisper-rs-sys starts compiling.

use std::process::Command;

fn main() {
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        && output.status.success()
    {
        let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=GIT_HASH={}", hash);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    if cfg!(feature = "cuda") {
        require_tool("nvcc", &["--version"], "CUDA toolkit", "https://developer.nvidia.com/cuda-downloads");
        if let Some(version) = nvcc_version() {
            println!("cargo::warning=Building with CUDA {}.{}", version.0, version.1);
        }
    }
    if cfg!(feature = "vulkan") {
        require_tool("vulkaninfo", &["--summary"], "Vulkan SDK", "https://vulkan.lunarg.com/");
    }
    if cfg!(feature = "hipblas") {
        require_tool("rocminfo", &[], "ROCm", "https://rocm.docs.amd.com/");
    }
}

/// Abort the build early with an install hint when `tool` can't be run.
fn require_tool(tool: &str, args: &[&str], what: &str, url: &str) {
    if Command::new(tool).args(args).output().is_err() {
        panic!(
            "\n\n`{tool}` not found: {what} is not installed.\n\
             Install: {url}\n\
             Or build without GPU support: cargo build --release\n"
        );
    }
    println!("cargo::warning={what} detected");
}

fn nvcc_version() -> Option<(u32, u32)> {
    let output = Command::new("nvcc").arg("--version").output().ok()?;
    parse_cuda_version(&String::from_utf8_lossy(&output.stdout))
}

/// Parse "release X.Y" from nvcc --version output.
fn parse_cuda_version(text: &str) -> Option<(u32, u32)> {
    // nvcc output: "Cuda compilation tools, release 12.4, V12.4.131"
    let after = &text[text.find("release ")? + 8..];
    let version = &after[..after.find(',')?];
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}
