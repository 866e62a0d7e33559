use log::info;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use hookenv_backend::{BackendProvider, HealthReport, LanguageBackend, Prefix};
use hookenv_core::lang_base::environment_dir;
use hookenv_platform::AppPaths;

use crate::backend_kind::BackendKind;
use crate::cli::{Args, Command, ConfigArgs, HealthArgs, InstallArgs, RunArgs};
use crate::error::HostError;
use crate::lock::InstallLock;
use crate::settings::HostSettings;

pub async fn execute(
    args: Args,
    mut settings: HostSettings,
    out: &mut dyn Write,
) -> Result<ExitCode, HostError> {
    let kind = select_backend(args.backend.as_deref(), &settings)?;
    let provider = kind.provider();

    match args.command {
        Command::Install(install_args) => {
            let paths = app_paths()?;
            let backend = provider.create_backend();
            install(
                backend.as_ref(),
                install_args,
                &paths.install_lock_file(),
                out,
            )
            .await
        }
        Command::Run(run_args) => run(provider.create_backend().as_ref(), run_args, out).await,
        Command::Health(health_args) => {
            health(provider.create_backend().as_ref(), health_args, out).await
        }
        Command::Detect => detect(provider.as_ref(), out).await,
        Command::Config(config_args) => {
            let paths = app_paths()?;
            config(&mut settings, config_args, &paths.settings_file(), out)
        }
    }
}

fn app_paths() -> Result<AppPaths, HostError> {
    let paths = AppPaths::new()?;
    paths
        .ensure_dirs()
        .map_err(|error| HostError::io("create app directories", error))?;
    Ok(paths)
}

fn select_backend(requested: Option<&str>, settings: &HostSettings) -> Result<BackendKind, HostError> {
    match requested {
        Some(name) => BackendKind::from_name(name).ok_or_else(|| HostError::UnknownBackend {
            name: name.to_string(),
        }),
        None => Ok(settings.backend()),
    }
}

fn version_or_default(backend: &dyn LanguageBackend, requested: Option<String>) -> String {
    requested.unwrap_or_else(|| backend.get_default_version())
}

fn emit(out: &mut dyn Write, line: &str) -> Result<(), HostError> {
    writeln!(out, "{line}").map_err(|error| HostError::io("write output", error))
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}

async fn install(
    backend: &dyn LanguageBackend,
    args: InstallArgs,
    lock_path: &Path,
    out: &mut dyn Write,
) -> Result<ExitCode, HostError> {
    let prefix = Prefix::new(args.prefix);
    let version = version_or_default(backend, args.language_version);

    let lock_path = lock_path.to_path_buf();
    let _lock = tokio::task::spawn_blocking(move || InstallLock::acquire(&lock_path)).await??;
    info!("Installing {} environment under {prefix}", backend.name());
    backend
        .install_environment(&prefix, &version, &args.additional_dependencies)
        .await?;

    if let Some(tag) = backend.environment_dir_tag() {
        emit(
            out,
            &format!(
                "installed {}",
                environment_dir(&prefix, tag, &version).display()
            ),
        )?;
    }
    Ok(ExitCode::SUCCESS)
}

async fn run(
    backend: &dyn LanguageBackend,
    args: RunArgs,
    out: &mut dyn Write,
) -> Result<ExitCode, HostError> {
    let prefix = Prefix::new(args.prefix);
    let version = version_or_default(backend, args.language_version);

    let output = backend
        .run_hook(&prefix, &version, &args.entry, &args.args, &args.files)
        .await?;

    out.write_all(&output.stdout)
        .map_err(|error| HostError::io("write hook stdout", error))?;
    std::io::stderr()
        .write_all(&output.stderr)
        .map_err(|error| HostError::io("write hook stderr", error))?;
    Ok(exit_code(output.exit_code))
}

async fn health(
    backend: &dyn LanguageBackend,
    args: HealthArgs,
    out: &mut dyn Write,
) -> Result<ExitCode, HostError> {
    let prefix = Prefix::new(args.prefix);
    let version = version_or_default(backend, args.language_version);

    match backend.health_check(&prefix, &version).await {
        HealthReport::Healthy => {
            emit(out, "healthy")?;
            Ok(ExitCode::SUCCESS)
        }
        HealthReport::Unhealthy(diagnosis) => {
            emit(out, &diagnosis)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn detect(provider: &dyn BackendProvider, out: &mut dyn Write) -> Result<ExitCode, HostError> {
    let detection = provider.detect().await;

    match detection.path {
        Some(path) if detection.found => {
            let version = detection.version.as_deref().unwrap_or("unknown version");
            emit(
                out,
                &format!(
                    "{}: {} ({version})",
                    provider.display_name(),
                    path.display()
                ),
            )?;
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            emit(out, &format!("{}: not found", provider.display_name()))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn config(
    settings: &mut HostSettings,
    args: ConfigArgs,
    settings_path: &Path,
    out: &mut dyn Write,
) -> Result<ExitCode, HostError> {
    let mut changed = false;
    if let Some(debug_logging) = args.debug_logging {
        settings.debug_logging = debug_logging;
        changed = true;
    }
    if let Some(name) = args.default_backend {
        let kind = select_backend(Some(&name), settings)?;
        settings.default_backend = Some(kind);
        changed = true;
    }

    if changed {
        settings
            .save_to(settings_path)
            .map_err(|error| HostError::io("save settings", error))?;
        info!("Saved settings to {}", settings_path.display());
    }

    let rendered = serde_json::to_string_pretty(settings)
        .map_err(|error| HostError::io("render settings", error.into()))?;
    emit(out, &rendered)?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use fs2::FileExt;
    use std::fs::OpenOptions;
    use std::path::PathBuf;
    use std::process::ExitCode;
    use std::sync::Mutex;

    use hookenv_backend::{
        BackendDetection, BackendError, BackendProvider, HealthReport, HookOutput,
        LanguageBackend, Prefix,
    };
    use hookenv_platform::EnvContext;

    use super::{config, detect, exit_code, health, install, run, select_backend};
    use crate::backend_kind::BackendKind;
    use crate::cli::{ConfigArgs, HealthArgs, InstallArgs, RunArgs};
    use crate::error::HostError;
    use crate::settings::HostSettings;

    #[derive(Default)]
    struct StubBackend {
        installs: Mutex<Vec<(PathBuf, String, Vec<String>)>>,
        fail_install: bool,
    }

    #[async_trait]
    impl LanguageBackend for StubBackend {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn environment_dir_tag(&self) -> Option<&'static str> {
            Some("stub")
        }

        fn in_env(&self, _prefix: &Prefix, _version: &str) -> EnvContext {
            EnvContext::ambient()
        }

        async fn health_check(&self, prefix: &Prefix, _version: &str) -> HealthReport {
            if prefix.is_dir("stub-default") {
                HealthReport::Healthy
            } else {
                HealthReport::Unhealthy("environment directory missing".to_string())
            }
        }

        async fn install_environment(
            &self,
            prefix: &Prefix,
            version: &str,
            additional_dependencies: &[String],
        ) -> Result<(), BackendError> {
            if self.fail_install {
                return Err(BackendError::fatal("nothing to install"));
            }
            self.installs
                .lock()
                .expect("lock installs")
                .push((
                    prefix.root().to_path_buf(),
                    version.to_string(),
                    additional_dependencies.to_vec(),
                ));
            Ok(())
        }

        async fn run_hook(
            &self,
            _prefix: &Prefix,
            _version: &str,
            entry: &str,
            args: &[String],
            file_args: &[String],
        ) -> Result<HookOutput, BackendError> {
            Ok(HookOutput {
                exit_code: i32::try_from(file_args.len()).expect("small file count"),
                stdout: format!("{entry} {}\n", args.join(" ")).into_bytes(),
                stderr: Vec::new(),
            })
        }
    }

    struct StubProvider {
        path: Option<PathBuf>,
    }

    #[async_trait]
    impl BackendProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn display_name(&self) -> &'static str {
            "Stub"
        }

        async fn detect(&self) -> BackendDetection {
            BackendDetection {
                found: self.path.is_some(),
                executable: self.path.as_ref().map(|_| "stub"),
                path: self.path.clone(),
                version: None,
            }
        }

        fn create_backend(&self) -> Box<dyn LanguageBackend> {
            Box::new(StubBackend::default())
        }
    }

    fn text(out: Vec<u8>) -> String {
        String::from_utf8(out).expect("utf-8 output")
    }

    #[test]
    fn explicit_backend_name_must_be_known() {
        let settings = HostSettings::default();

        assert_eq!(
            select_backend(Some("coursier"), &settings).expect("known backend"),
            BackendKind::Coursier
        );
        assert!(matches!(
            select_backend(Some("ruby"), &settings),
            Err(HostError::UnknownBackend { name }) if name == "ruby"
        ));
        assert_eq!(
            select_backend(None, &settings).expect("default backend"),
            BackendKind::DEFAULT
        );
    }

    #[test]
    fn exit_codes_outside_u8_become_failure() {
        assert_eq!(exit_code(0), ExitCode::SUCCESS);
        assert_eq!(exit_code(3), ExitCode::from(3));
        assert_eq!(exit_code(-9), ExitCode::FAILURE);
        assert_eq!(exit_code(300), ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn install_uses_default_version_and_reports_directory() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let backend = StubBackend::default();
        let mut out = Vec::new();

        let code = install(
            &backend,
            InstallArgs {
                prefix: temp_dir.path().to_path_buf(),
                language_version: None,
                additional_dependencies: vec!["org:artifact:1.0".to_string()],
            },
            &temp_dir.path().join("install.lock"),
            &mut out,
        )
        .await
        .expect("install succeeds");

        assert_eq!(code, ExitCode::SUCCESS);
        let installs = backend.installs.lock().expect("lock installs");
        assert_eq!(
            *installs,
            vec![(
                temp_dir.path().to_path_buf(),
                "default".to_string(),
                vec!["org:artifact:1.0".to_string()]
            )]
        );
        assert_eq!(
            text(out),
            format!("installed {}\n", temp_dir.path().join("stub-default").display())
        );
    }

    #[tokio::test]
    async fn install_waits_for_lock_without_stalling_the_runtime() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let lock_path = temp_dir.path().join("install.lock");
        let holder = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .expect("open lock file");
        holder.lock_exclusive().expect("hold lock");
        let backend = StubBackend::default();

        // The release runs on the same single-threaded runtime, so it only
        // happens if waiting for the lock leaves that thread free.
        let release = async {
            tokio::task::yield_now().await;
            FileExt::unlock(&holder).expect("release lock");
        };
        let mut output = Vec::new();
        let (result, ()) = tokio::join!(
            install(
                &backend,
                InstallArgs {
                    prefix: temp_dir.path().to_path_buf(),
                    language_version: None,
                    additional_dependencies: vec!["org:artifact:1.0".to_string()],
                },
                &lock_path,
                &mut output,
            ),
            release
        );

        assert_eq!(result.expect("install succeeds"), ExitCode::SUCCESS);
        assert_eq!(backend.installs.lock().expect("lock installs").len(), 1);
    }

    #[tokio::test]
    async fn install_failure_propagates_backend_error() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let backend = StubBackend {
            fail_install: true,
            ..StubBackend::default()
        };

        let result = install(
            &backend,
            InstallArgs {
                prefix: temp_dir.path().to_path_buf(),
                language_version: Some("default".to_string()),
                additional_dependencies: Vec::new(),
            },
            &temp_dir.path().join("install.lock"),
            &mut Vec::new(),
        )
        .await;

        assert!(matches!(result, Err(HostError::Backend(error)) if error.is_fatal()));
    }

    #[tokio::test]
    async fn run_forwards_stdout_and_exit_code() {
        let mut out = Vec::new();

        let code = run(
            &StubBackend::default(),
            RunArgs {
                prefix: PathBuf::from("/repo"),
                entry: "scalafmt".to_string(),
                language_version: None,
                args: vec!["--test".to_string()],
                files: vec!["A.scala".to_string(), "B.scala".to_string()],
            },
            &mut out,
        )
        .await
        .expect("run succeeds");

        assert_eq!(code, ExitCode::from(2));
        assert_eq!(text(out), "scalafmt --test\n");
    }

    #[tokio::test]
    async fn health_prints_diagnosis_and_fails_when_unhealthy() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let backend = StubBackend::default();
        let args = || HealthArgs {
            prefix: temp_dir.path().to_path_buf(),
            language_version: None,
        };

        let mut out = Vec::new();
        let code = health(&backend, args(), &mut out)
            .await
            .expect("health runs");
        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(text(out), "environment directory missing\n");

        std::fs::create_dir(temp_dir.path().join("stub-default")).expect("create envdir");
        let mut out = Vec::new();
        let code = health(&backend, args(), &mut out)
            .await
            .expect("health runs");
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(text(out), "healthy\n");
    }

    #[tokio::test]
    async fn detect_reports_launcher_path() {
        let mut out = Vec::new();
        let code = detect(
            &StubProvider {
                path: Some(PathBuf::from("/usr/bin/stub")),
            },
            &mut out,
        )
        .await
        .expect("detect runs");
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(text(out), "Stub: /usr/bin/stub (unknown version)\n");

        let mut out = Vec::new();
        let code = detect(&StubProvider { path: None }, &mut out)
            .await
            .expect("detect runs");
        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(text(out), "Stub: not found\n");
    }

    #[test]
    fn config_saves_only_when_changed() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let path = temp_dir.path().join("settings.json");
        let mut settings = HostSettings::default();

        config(
            &mut settings,
            ConfigArgs {
                debug_logging: None,
                default_backend: None,
            },
            &path,
            &mut Vec::new(),
        )
        .expect("show settings");
        assert!(!path.exists());

        let mut out = Vec::new();
        config(
            &mut settings,
            ConfigArgs {
                debug_logging: Some(true),
                default_backend: Some("coursier".to_string()),
            },
            &path,
            &mut out,
        )
        .expect("update settings");

        assert_eq!(HostSettings::load_from(&path), settings);
        assert!(settings.debug_logging);
        assert!(text(out).contains("\"default_backend\": \"coursier\""));
    }

    #[test]
    fn config_rejects_unknown_backend_without_saving() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let path = temp_dir.path().join("settings.json");

        let result = config(
            &mut HostSettings::default(),
            ConfigArgs {
                debug_logging: Some(true),
                default_backend: Some("ruby".to_string()),
            },
            &path,
            &mut Vec::new(),
        );

        assert!(matches!(result, Err(HostError::UnknownBackend { .. })));
        assert!(!path.exists());
    }
}
