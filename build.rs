fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    #[cfg(not(target_os = "linux"))]
    compile_error!("lab-health only works on Linux hosts");

    // Capture build time at compile time
    let build_time = std::process::Command::new("date")
        .args(["-u", "+%Y-%m-%d %H:%M:%S UTC"])
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);
}
