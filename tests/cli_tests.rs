//! End-to-end tests of the hexbuild binary: exit codes and diagnostics.

mod helpers;

use helpers::{assert_file_contains, stderr, stdout, TestEnv};
use hexbuild::manifest::DriverManifest;

#[test]
fn test_drivers_writes_ordered_manifest() {
    let env = TestEnv::new();
    env.simple_driver("fs", "fs.sys", &[]);
    env.simple_driver("net", "net.sys", &[]);
    env.simple_driver("disk", "disk.sys", &["fs.sys"]);

    let out = env.hexbuild(&["drivers", "drivers/fs", "drivers/net", "drivers/disk"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let text = stdout(&out);
    let net = text.find("-- net.sys will be loaded").unwrap();
    let disk = text.find("-- disk.sys will be loaded").unwrap();
    let fs = text.find("-- fs.sys will be loaded").unwrap();
    assert!(net < disk && disk < fs);
    assert!(text.contains("with priority CRITICAL and environment NORMAL"));

    let manifest = DriverManifest::load(&env.base_dir.join("driver_conf.json")).unwrap();
    let names: Vec<&str> = manifest.drivers.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(names, vec!["net.sys", "disk.sys", "fs.sys"]);
}

#[test]
fn test_drivers_cycle_exits_nonzero() {
    let env = TestEnv::new();
    env.simple_driver("a", "a.sys", &["b.sys"]);
    env.simple_driver("b", "b.sys", &["c.sys"]);
    env.simple_driver("c", "c.sys", &["a.sys"]);

    let out = env.hexbuild(&["drivers", "drivers/a", "drivers/b", "drivers/c"]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("cycle"), "stderr: {}", err);
    assert!(err.contains("a.sys, b.sys, c.sys"), "stderr: {}", err);
    assert!(!env.base_dir.join("driver_conf.json").exists());
}

#[test]
fn test_drivers_unknown_reference_exits_nonzero() {
    let env = TestEnv::new();
    env.simple_driver("x", "x.sys", &["y.sys"]);

    let out = env.hexbuild(&["drivers", "drivers/x"]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("\"y.sys\""), "stderr: {}", err);
    assert!(!env.base_dir.join("driver_conf.json").exists());
}

#[test]
fn test_drivers_warns_but_succeeds_on_bad_priority() {
    let env = TestEnv::new();
    env.driver("odd", "FILENAME = \"odd.sys\"\nPRIORITY = MAYBE\nENVIRONMENT = ANY\n");

    let out = env.hexbuild(&["drivers", "-o", "out.json", "--pretty", "drivers/odd"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("WARNING: Driver \"odd.sys\" has unrecognized priority \"MAYBE\""));

    let path = env.base_dir.join("out.json");
    assert_file_contains(&path, "\"priority\": 2");
    assert_file_contains(&path, "\"environment\": 2");
}

#[test]
fn test_drivers_missing_conf_exits_nonzero() {
    let env = TestEnv::new();
    std::fs::create_dir_all(env.drivers.join("nothing")).unwrap();

    let out = env.hexbuild(&["drivers", "drivers/nothing"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("driver.conf not found"));
}

#[test]
fn test_drivers_empty_set() {
    let env = TestEnv::new();
    let out = env.hexbuild(&["drivers"]);
    assert!(out.status.success());
    assert_file_contains(
        &env.base_dir.join("driver_conf.json"),
        r#"{"version":1,"drivers":[]}"#,
    );
}

#[test]
fn test_manifest_path_from_dotenv() {
    let env = TestEnv::new();
    env.write(".env", "DRIVER_MANIFEST=initrd_root/drivers/driver_conf.json\n");
    std::fs::create_dir_all(env.base_dir.join("initrd_root/drivers")).unwrap();
    env.simple_driver("ps2", "ps2.sys", &[]);

    let out = env.hexbuild(&["drivers", "drivers/ps2"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_file_contains(
        &env.base_dir.join("initrd_root/drivers/driver_conf.json"),
        "ps2.sys",
    );

    let show = env.hexbuild(&["show", "manifest"]);
    assert!(show.status.success());
    assert!(stdout(&show).contains("ps2.sys"));
}

#[test]
fn test_check_strict() {
    let env = TestEnv::new();
    env.simple_driver("a", "a.sys", &["a.sys"]);

    let lenient = env.hexbuild(&["check", "drivers/a"]);
    assert!(lenient.status.success());
    assert!(stdout(&lenient).contains("[FAIL] constraints"));

    let strict = env.hexbuild(&["check", "--strict", "drivers/a"]);
    assert!(!strict.status.success());
}

#[test]
fn test_driver_dirs_output_line() {
    let env = TestEnv::new();
    env.write("drivers/make.config", "");
    env.driver("storage/ahci", "FILENAME = \"ahci.sys\"\nARCH = I386 OR X86_64\n");
    env.driver("ps2", "FILENAME = \"ps2.sys\"\nARCH = ANY\n");

    let out = env.hexbuild(&["driver-dirs", "x86_64"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "ps2 storage-ahci\n");
}

#[test]
fn test_app_info_requests() {
    let env = TestEnv::new();
    env.write("app/app.conf", "APP_NAME = \"shell\"\nINITRD\n");

    let name = env.hexbuild(&["app-info", "app", "name"]);
    assert_eq!(stdout(&name), "shell\n");

    let initrd = env.hexbuild(&["app-info", "app", "initrd"]);
    assert_eq!(stdout(&initrd), "YES\n");

    let cflags = env.hexbuild(&["app-info", "app", "cflags"]);
    assert!(cflags.status.success());
    assert_eq!(stdout(&cflags), "");

    let dir = env.hexbuild(&["app-info", "app", "install-dir"]);
    assert!(!dir.status.success());
}

#[test]
fn test_stamp_accepts_any_case() {
    let env = TestEnv::new();
    let header = env.write(
        "source/kernel/include/CONFIG.h",
        "#define BUILD_NUMBER \"1\"\n#define BUILD_DATE \"\"\n#define BUILD_CONFIGURATION \"DEBUG\"\n",
    );

    let out = env.hexbuild(&["stamp", "Release"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Build number: 2"));
    assert_file_contains(&header, "#define BUILD_CONFIGURATION \"RELEASE\"");

    let bad = env.hexbuild(&["stamp", "profile"]);
    assert!(!bad.status.success());
}
