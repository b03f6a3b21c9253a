use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

const TMP_DIR: &str = env!("CARGO_TARGET_TMPDIR");
const KSYMGEN: &str = env!("CARGO_BIN_EXE_ksymgen");

const FIXTURE_LISTING: &str = "\
00001000 T g_linker_symbol_text_begin
00001000 T foo
00001010 T foobar
00001020 T barfoo
0000102f T g_linker_symbol_text_end
";

/// Writes a fake `nm` that ignores its arguments and prints a fixed
/// listing, then returns the directory holding it so it can be
/// prepended to `PATH`.
fn install_fake_nm(dir: &Path, listing: &str) -> PathBuf {
    let bin_dir = dir.join("bin");
    fs::create_dir_all(&bin_dir).unwrap();
    let nm_path = bin_dir.join("nm");
    fs::write(&nm_path, format!("#!/bin/sh\ncat <<'EOF'\n{listing}EOF\n")).unwrap();
    let mut perms = fs::metadata(&nm_path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&nm_path, perms).unwrap();
    bin_dir
}

fn fake_path_with(bin_dir: &Path) -> String {
    let existing = std::env::var("PATH").unwrap_or_default();
    format!("{}:{existing}", bin_dir.display())
}

#[test]
fn no_binary_emits_empty_tables() {
    let dir = Path::new(TMP_DIR).join("no_binary_emits_empty_tables");
    fs::create_dir_all(&dir).unwrap();
    let out_file = dir.join("symtab.c");

    let status = Command::new(KSYMGEN)
        .arg(&out_file)
        .status()
        .expect("failed to run ksymgen");
    assert!(status.success());

    let contents = fs::read_to_string(&out_file).unwrap();
    assert!(contents.contains("const u32 g_symbol_count = 0;"));
    assert!(contents.contains("g_symbol_token_table"));
}

#[test]
fn fake_binary_produces_c_symbol_table() {
    let dir = Path::new(TMP_DIR).join("fake_binary_produces_c_symbol_table");
    fs::create_dir_all(&dir).unwrap();
    let bin_dir = install_fake_nm(&dir, FIXTURE_LISTING);
    let out_file = dir.join("symtab.c");
    let fake_binary = dir.join("vmkernel"); // never read; the fake nm ignores it
    fs::write(&fake_binary, b"").unwrap();

    let status = Command::new(KSYMGEN)
        .arg(&out_file)
        .arg("--binary")
        .arg(&fake_binary)
        .env("PATH", fake_path_with(&bin_dir))
        .status()
        .expect("failed to run ksymgen");
    assert!(status.success());

    let contents = fs::read_to_string(&out_file).unwrap();
    assert!(contents.contains("const u32 g_symbol_count = 3;"));
    assert!(contents.contains("/* foo */"));
    assert!(contents.contains("/* foobar */"));
    assert!(contents.contains("/* barfoo */"));
    // g_linker_symbol_* sentinels are dropped from the emitted table.
    assert!(!contents.contains("g_linker_symbol_text_begin */"));
}

#[test]
fn fake_binary_produces_gas_symbol_table_in_linux_mode() {
    let dir = Path::new(TMP_DIR).join("fake_binary_produces_gas_symbol_table_in_linux_mode");
    fs::create_dir_all(&dir).unwrap();
    let listing = "\
00001000 T _stext
00001000 T foo
00001010 t foobar
0000102f T _etext
";
    let bin_dir = install_fake_nm(&dir, listing);
    let out_file = dir.join("symtab.S");
    let fake_binary = dir.join("vmlinux");
    fs::write(&fake_binary, b"").unwrap();

    let status = Command::new(KSYMGEN)
        .arg(&out_file)
        .arg("--binary")
        .arg(&fake_binary)
        .arg("--linux-mode")
        .env("PATH", fake_path_with(&bin_dir))
        .status()
        .expect("failed to run ksymgen");
    assert!(status.success());

    let contents = fs::read_to_string(&out_file).unwrap();
    assert!(contents.contains(".section .rodata"));
    assert!(contents.contains("kallsyms_num_syms"));
    assert!(contents.contains("kallsyms_offsets"));
}

#[test]
fn same_input_produces_byte_identical_output() {
    let dir = Path::new(TMP_DIR).join("same_input_produces_byte_identical_output");
    fs::create_dir_all(&dir).unwrap();
    let bin_dir = install_fake_nm(&dir, FIXTURE_LISTING);
    let fake_binary = dir.join("vmkernel");
    fs::write(&fake_binary, b"").unwrap();
    let path = fake_path_with(&bin_dir);

    let mut outputs = Vec::new();
    for i in 0..2 {
        let out_file = dir.join(format!("symtab_{i}.c"));
        let status = Command::new(KSYMGEN)
            .arg(&out_file)
            .arg("--binary")
            .arg(&fake_binary)
            .env("PATH", &path)
            .status()
            .expect("failed to run ksymgen");
        assert!(status.success());
        outputs.push(fs::read(&out_file).unwrap());
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn nm_failure_is_reported_on_stderr() {
    let dir = Path::new(TMP_DIR).join("nm_failure_is_reported_on_stderr");
    fs::create_dir_all(&dir).unwrap();
    let out_file = dir.join("symtab.c");
    let missing_binary = dir.join("does-not-exist");

    let output = Command::new(KSYMGEN)
        .arg(&out_file)
        .arg("--binary")
        .arg(&missing_binary)
        .output()
        .expect("failed to run ksymgen");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("ksymgen: error:"));
    assert!(!out_file.exists());
}
