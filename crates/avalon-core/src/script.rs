//! External script execution.
//!
//! Build, install, and uninstall scripts are opaque: the runner picks an
//! interpreter from the file extension, passes the documented positional
//! arguments, and interprets nothing but the exit code.

use std::path::Path;
use std::process::Command;

use crate::error::InstallError;
use crate::platform::is_user_install_host;

/// Interpreter for a script path, chosen by extension: `.py` runs under
/// `python3`, anything else under `bash`.
pub fn interpreter_for(script: &Path) -> &'static str {
    match script.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("py") => "python3",
        _ => "bash",
    }
}

/// Rewrite embedded package-install invocations to stay inside the user
/// prefix. Idempotent: already-rewritten invocations are left alone.
pub fn force_user_installs(source: &str) -> String {
    let mut rewritten = source
        .replace("pip3 install", "pip3 install --user")
        .replace("pip install", "pip install --user");
    // Collapse doubled flags from scripts that already pass --user.
    while rewritten.contains("--user --user") {
        rewritten = rewritten.replace("--user --user", "--user");
    }
    rewritten
}

/// Run a script with positional arguments, from `cwd`.
///
/// On a user-install host the script's source text is rewritten in place
/// first (a side effect on the script file itself, not just the subprocess
/// environment), forcing user-local installs for any embedded pip calls.
///
/// # Errors
///
/// Returns [`InstallError::Script`] when the script exits nonzero, or
/// [`InstallError::Io`] when it cannot be read, rewritten, or spawned.
pub fn run_script(script: &Path, args: &[String], cwd: &Path) -> Result<(), InstallError> {
    if is_user_install_host() {
        rewrite_in_place(script)?;
    }

    let interpreter = interpreter_for(script);
    tracing::debug!("{interpreter} {} {}", script.display(), args.join(" "));

    let status = Command::new(interpreter)
        .arg(script)
        .args(args)
        .current_dir(cwd)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(InstallError::Script {
            script: script.display().to_string(),
            code: status.code().unwrap_or(-1),
        })
    }
}

fn rewrite_in_place(script: &Path) -> std::io::Result<()> {
    let source = std::fs::read_to_string(script)?;
    let rewritten = force_user_installs(&source);
    if rewritten != source {
        std::fs::write(script, rewritten)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_interpreter_selection() {
        assert_eq!(interpreter_for(Path::new("setup.py")), "python3");
        assert_eq!(interpreter_for(Path::new("setup.PY")), "python3");
        assert_eq!(interpreter_for(Path::new("build.sh")), "bash");
        assert_eq!(interpreter_for(Path::new("script")), "bash");
    }

    #[test]
    fn test_force_user_installs() {
        let script = "pip install requests\npip3 install flask\necho done\n";
        assert_eq!(
            force_user_installs(script),
            "pip install --user requests\npip3 install --user flask\necho done\n"
        );
    }

    #[test]
    fn test_force_user_installs_is_idempotent() {
        let script = "pip install requests\n";
        let once = force_user_installs(script);
        assert_eq!(force_user_installs(&once), once);
    }

    #[test]
    fn test_run_script_success_and_arguments() {
        let tmp = tempdir().unwrap();
        let script = tmp.path().join("echo.sh");
        std::fs::write(&script, "printf '%s' \"$1\" > \"$2\"\n").unwrap();
        let out = tmp.path().join("out");

        run_script(
            &script,
            &["hello world".to_string(), out.to_string_lossy().to_string()],
            tmp.path(),
        )
        .unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hello world");
    }

    #[test]
    fn test_run_script_nonzero_exit() {
        let tmp = tempdir().unwrap();
        let script = tmp.path().join("fail.sh");
        std::fs::write(&script, "exit 3\n").unwrap();

        let err = run_script(&script, &[], tmp.path()).unwrap_err();
        match err {
            InstallError::Script { code, .. } => assert_eq!(code, 3),
            other => panic!("expected Script, got {other:?}"),
        }
    }
}
