use std::collections::BTreeMap;

use mopy_build::base_image::DISTROLESS_IMAGE;
use mopy_build::eject::{EjectError, eject, is_ejected, write_dockerfile};
use mopy_build::{Arch, BaseImage, BuildDefaults, DependencyPlan, DockerfileGenerator};
use mopy_core::MopyConfig;
use proptest::prelude::*;
use tempfile::TempDir;

fn config(python: &str, pip: &[&str]) -> MopyConfig {
    MopyConfig {
        python_version: python.to_owned(),
        pip: pip.iter().map(|s| (*s).to_owned()).collect(),
        ..Default::default()
    }
}

fn render(config: &MopyConfig) -> String {
    DockerfileGenerator::new(config, Arch::Amd64).render()
}

fn runtime_section(output: &str) -> &str {
    output.split("Stage 2: Runtime").nth(1).unwrap()
}

fn builder_section(output: &str) -> &str {
    output
        .split("Stage 2: Runtime")
        .next()
        .unwrap()
        .split("Stage 1: Builder")
        .nth(1)
        .unwrap()
}

// ── Golden output ──

#[test]
fn minimal_config_renders_exactly() {
    let config = config("3.11.2", &[]);
    let output = render(&config);

    let expected = r#"# syntax=docker/dockerfile:1

# === Stage 1: Builder ===
FROM python:3.11.2 AS builder
WORKDIR /build
ENV GIT_SSH_COMMAND="ssh -o StrictHostKeyChecking=no"
ENV PIP_DISABLE_PIP_VERSION_CHECK=1
ENV PIP_NO_WARN_SCRIPT_LOCATION=0
ENV PIP_USER=1
ENV PYTHONPYCACHEPREFIX=$HOME/.pycache

# === Stage 2: Runtime ===
FROM python:3.11.2-slim
RUN useradd --uid=65532 --user-group --home-dir=/home/nonroot --create-home nonroot
USER 65532:65532
LABEL moby.buildkit.frontend="mopy" mopy.python.version="3.11.2" mopy.version="v1" org.opencontainers.image.description="autogenerated by mopy"
ENV PYTHONUNBUFFERED=1
"#;
    assert_eq!(output, expected);
}

#[test]
fn full_config_builder_install_step() {
    let mut config = config(
        "3.9.18",
        &[
            "./requirements.txt",
            "numpy",
            "./libs/mylib/",
            "git+ssh://git@github.com/org/private.git",
            "git+https://github.com/org/public.git",
        ],
    );
    config.apt = vec!["libpq-dev".to_owned()];
    config.env.insert("APP_MODE".to_owned(), "prod".to_owned());
    config.project = Some("./app/".to_owned());

    let output = render(&config);
    let builder: Vec<&str> = builder_section(&output).lines().collect();

    assert!(builder.contains(&"COPY --link libs/mylib /tmp/1/mylib"));
    assert!(builder.contains(
        &"RUN --mount=type=cache,target=/root/.cache --mount=type=ssh,required=true \
          --mount=type=bind,source=requirements.txt,target=/tmp/0/requirements.txt \
          pip install -r /tmp/0/requirements.txt /tmp/1/mylib numpy \
          git+https://github.com/org/public.git git+ssh://git@github.com/org/private.git"
    ));
    assert!(builder.contains(
        &"RUN --mount=type=cache,target=/var/cache/apt --mount=type=cache,target=/var/lib/apt \
          apt-get update && apt-get install -y git-lfs libpq-dev"
    ));
    assert!(builder.contains(&"ENV APP_MODE=prod"));

    let runtime: Vec<&str> = runtime_section(&output).lines().skip(1).collect();
    let from_line = format!("FROM {DISTROLESS_IMAGE}");
    assert_eq!(
        runtime,
        vec![
            from_line.as_str(),
            r#"LABEL moby.buildkit.frontend="mopy" mopy.python.version="3.9.18" mopy.version="v1" org.opencontainers.image.description="autogenerated by mopy""#,
            "ENV APP_MODE=prod",
            "ENV PYTHONUNBUFFERED=1",
            "COPY --from=builder --chown=nonroot:nonroot /root/.local/ /home/nonroot/.local/",
            "COPY --chown=nonroot:nonroot app /home/nonroot/app",
            r#"ENTRYPOINT ["python", "-u"]"#,
            "WORKDIR /home/nonroot/app",
            r#"CMD ["main.py"]"#,
        ]
    );
}

#[test]
fn builder_steps_are_in_fixed_order() {
    let mut config = config("3.12", &["./vendor/pkg", "flask"]);
    config.apt = vec!["gcc".to_owned()];
    let output = render(&config);

    let position = |needle: &str| {
        output
            .find(needle)
            .unwrap_or_else(|| panic!("missing {needle:?}"))
    };
    let from = position("AS builder");
    let apt = position("apt-get install");
    let env = position("ENV PIP_USER=1");
    let copy = position("COPY --link");
    let install = position("pip install");
    let cleanup = position("-name '__pycache__' -delete");

    assert!(from < apt);
    assert!(apt < env);
    assert!(env < copy);
    assert!(copy < install);
    assert!(install < cleanup);
}

// ── Empty dependencies ──

#[test]
fn no_dependencies_elides_install_steps() {
    let mut config = config("3.11.2", &[]);
    config.apt = vec!["curl".to_owned()];
    config.project = Some("main.py".to_owned());
    let output = render(&config);

    assert!(!output.contains("pip install"));
    assert!(!output.contains("COPY --link"));
    assert!(!output.contains("--mount=type=bind"));
    assert!(!output.contains("--mount=type=cache,target=/root/.cache"));
    assert!(!output.contains("COPY --from=builder"));
    assert!(!output.contains("find /root/.local"));
    // OS packages are independent of pip dependencies.
    assert!(output.contains("apt-get install -y curl"));
}

// ── OS packages ──

#[test]
fn no_apt_step_without_packages_or_vcs() {
    let output = render(&config("3.11.2", &["numpy", "./requirements.txt"]));
    assert!(!output.contains("apt-get"));
}

#[test]
fn http_dependency_forces_vcs_helper() {
    let output = render(&config("3.11.2", &["https://example.com/pkg-1.0.tar.gz"]));
    assert!(output.contains("apt-get update && apt-get install -y git-lfs\n"));
    assert!(output.contains("--mount=type=cache,target=/var/cache/apt"));
    assert!(output.contains("--mount=type=cache,target=/var/lib/apt"));
}

#[test]
fn ssh_dependency_forces_vcs_helper_and_agent_mount() {
    let mut config = config("3.11.2", &["git+ssh://git@github.com/org/repo.git"]);
    config.apt = vec!["curl".to_owned(), "git-lfs".to_owned()];
    let output = render(&config);

    assert!(output.contains("apt-get install -y git-lfs curl\n"));
    assert!(output.contains("--mount=type=ssh,required=true"));
}

#[test]
fn no_ssh_mount_without_ssh_dependency() {
    let output = render(&config("3.11.2", &["git+https://github.com/org/repo.git"]));
    assert!(!output.contains("--mount=type=ssh"));
}

// ── Environment & labels ──

#[test]
fn env_override_wins_in_both_stages() {
    let mut config = config("3.11.2", &[]);
    config.env.insert("PIP_USER".to_owned(), "0".to_owned());
    config.env.insert("PYTHONUNBUFFERED".to_owned(), "0".to_owned());
    let output = render(&config);

    assert!(builder_section(&output).contains("ENV PIP_USER=0\n"));
    assert!(!output.contains("ENV PIP_USER=1"));
    assert!(runtime_section(&output).contains("ENV PYTHONUNBUFFERED=0\n"));
    assert!(!output.contains("ENV PYTHONUNBUFFERED=1"));
}

#[test]
fn label_override_wins() {
    let mut config = config("3.11.2", &[]);
    config
        .labels
        .insert("mopy.version".to_owned(), "custom".to_owned());
    config
        .labels
        .insert("org.opencontainers.image.title".to_owned(), "svc".to_owned());
    let output = render(&config);

    assert!(output.contains(r#"mopy.version="custom""#));
    assert!(!output.contains(r#"mopy.version="v1""#));
    assert!(output.contains(r#"org.opencontainers.image.title="svc""#));
}

#[test]
fn env_order_does_not_depend_on_insertion_order() {
    let mut forward = config("3.11.2", &[]);
    let mut backward = config("3.11.2", &[]);
    let pairs = [("ZED", "1"), ("ALPHA", "2"), ("MIDDLE", "3")];
    for (k, v) in pairs {
        forward.env.insert(k.to_owned(), v.to_owned());
    }
    for (k, v) in pairs.iter().rev() {
        backward.env.insert((*k).to_owned(), (*v).to_owned());
    }

    assert_eq!(render(&forward), render(&backward));
}

#[test]
fn custom_defaults_replace_builtin_tables() {
    let mut config = config("3.11.2", &["git+https://github.com/org/repo.git"]);
    config.project = Some("./svc".to_owned());
    let defaults = BuildDefaults {
        build_env: BTreeMap::from([("ONLY".to_owned(), "builder".to_owned())]),
        run_env: BTreeMap::new(),
        labels: BTreeMap::new(),
        vcs_packages: vec!["git".to_owned()],
        entry_module: "app.py".to_owned(),
    };

    let output = DockerfileGenerator::new(&config, Arch::Amd64)
        .with_defaults(defaults)
        .render();

    assert!(output.contains("ENV ONLY=builder"));
    assert!(!output.contains("PIP_USER"));
    assert!(!output.contains("PYTHONUNBUFFERED"));
    assert!(output.contains("apt-get install -y git\n"));
    // The python version label is always present.
    assert!(output.contains(r#"LABEL mopy.python.version="3.11.2""#));
    assert!(output.contains(r#"CMD ["app.py"]"#));
}

// ── Base image ──

#[test]
fn python_39_on_amd64_uses_distroless() {
    let config = config("3.9.18", &[]);
    let output = DockerfileGenerator::new(&config, Arch::Amd64).render();

    assert!(runtime_section(&output).contains(&format!("FROM {DISTROLESS_IMAGE}\n")));
    assert!(!output.contains("useradd"));
    assert!(!output.contains("USER 65532"));
}

#[test]
fn python_39_on_arm64_uses_distroless() {
    assert_eq!(BaseImage::select("3.9.18", &Arch::Arm64), BaseImage::Distroless);
    assert_eq!(BaseImage::select("3.9", &Arch::Arm64), BaseImage::Distroless);
}

#[test]
fn python_39_on_other_arch_falls_back() {
    let image = BaseImage::select("3.9.18", &Arch::Other("s390x".to_owned()));
    assert_eq!(
        image,
        BaseImage::Slim {
            python_version: "3.9.18".to_owned()
        }
    );
}

#[test]
fn python_311_falls_back_on_every_arch() {
    for arch in [Arch::Amd64, Arch::Arm64, Arch::Other("ppc64le".to_owned())] {
        let config = config("3.11.2", &[]);
        let output = DockerfileGenerator::new(&config, arch).render();
        let runtime = runtime_section(&output);

        assert!(runtime.contains("FROM python:3.11.2-slim\n"));
        assert!(runtime.contains(
            "RUN useradd --uid=65532 --user-group --home-dir=/home/nonroot --create-home nonroot\n"
        ));
        assert!(runtime.contains("USER 65532:65532\n"));
        assert!(!output.contains("distroless"));
    }
}

#[test]
fn builder_always_uses_full_image() {
    let output = render(&config("3.9.18", &[]));
    assert!(output.contains("FROM python:3.9.18 AS builder\n"));
}

// ── Project ──

#[test]
fn single_file_project() {
    let mut config = config("3.11.2", &[]);
    config.project = Some("./app.py".to_owned());
    let runtime = runtime_section(&render(&config)).to_owned();

    assert!(runtime.contains("COPY --chown=nonroot:nonroot app.py /home/nonroot/app.py\n"));
    assert!(runtime.contains("ENTRYPOINT [\"python\", \"-u\"]\n"));
    assert!(runtime.contains("WORKDIR /home/nonroot\n"));
    assert!(runtime.ends_with("CMD [\"/home/nonroot/app.py\"]\n"));
}

#[test]
fn directory_project() {
    let mut config = config("3.11.2", &[]);
    config.project = Some("services/api/".to_owned());
    let runtime = runtime_section(&render(&config)).to_owned();

    assert!(runtime.contains("COPY --chown=nonroot:nonroot services/api /home/nonroot/api\n"));
    assert!(runtime.contains("WORKDIR /home/nonroot/api\n"));
    assert!(runtime.ends_with("CMD [\"main.py\"]\n"));
}

#[test]
fn no_project_no_entrypoint() {
    let output = render(&config("3.11.2", &["numpy"]));
    assert!(!output.contains("ENTRYPOINT"));
    assert!(!output.contains("CMD"));
}

// ── Install arguments ──

#[test]
fn specifiers_are_shell_quoted() {
    let output = render(&config("3.11.2", &["numpy>=1.26", "requests[socks]", "flask"]));
    assert!(output.contains("pip install 'numpy>=1.26' 'requests[socks]' flask\n"));
}

#[test]
fn wheel_and_sdist_files_install_by_file_name() {
    let output = render(&config(
        "3.12",
        &["./wheels/pkg-1.0-py3-none-any.whl", "./dist/other-2.0.tar.gz"],
    ));
    assert!(output.contains(
        "COPY --link wheels/pkg-1.0-py3-none-any.whl /tmp/0/pkg-1.0-py3-none-any.whl\n"
    ));
    assert!(output.contains("COPY --link dist/other-2.0.tar.gz /tmp/1/other-2.0.tar.gz\n"));
    assert!(output.contains(
        "pip install /tmp/0/pkg-1.0-py3-none-any.whl /tmp/1/other-2.0.tar.gz\n"
    ));
}

#[test]
fn entry_module_is_json_escaped() {
    let mut config = config("3.12", &[]);
    config.project = Some("./svc".to_owned());
    let defaults = BuildDefaults {
        entry_module: r#"run "main".py"#.to_owned(),
        ..Default::default()
    };

    let output = DockerfileGenerator::new(&config, Arch::Amd64)
        .with_defaults(defaults)
        .render();
    assert!(output.ends_with("CMD [\"run \\\"main\\\".py\"]\n"));
}

#[test]
fn remote_arguments_follow_locals_by_kind() {
    let plan_input: Vec<String> = [
        "git+ssh://git@host/a.git",
        "https://host/b.tar.gz",
        "c",
        "./d",
        "./e/requirements.txt",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect();
    let plan = DependencyPlan::resolve(&plan_input);

    assert_eq!(
        plan.install_args(),
        vec![
            "-r",
            "/tmp/1/requirements.txt",
            "/tmp/0/d",
            "c",
            "https://host/b.tar.gz",
            "git+ssh://git@host/a.git",
        ]
    );
}

// ── Index consistency ──

/// Strategy: a declaration of one of the five kinds built from a short name.
fn declaration() -> impl Strategy<Value = String> {
    (0u8..5, "[a-z][a-z0-9]{0,6}").prop_map(|(kind, name)| match kind {
        0 => format!("./{name}/requirements.txt"),
        1 => format!("./libs/{name}/"),
        2 => name,
        3 => format!("git+https://host/{name}.git"),
        _ => format!("git+ssh://git@host/{name}.git"),
    })
}

proptest! {
    #[test]
    fn local_indices_agree_across_fragments(
        declarations in proptest::collection::vec(declaration(), 0..12)
    ) {
        let plan = DependencyPlan::resolve(&declarations);
        let copies = plan.copy_instructions();
        let flags = plan.mount_flags();
        let args = plan.install_args();

        let mut index = 0;
        for raw in &declarations {
            if let Some(dir) = raw.strip_suffix("/requirements.txt").and_then(|d| d.strip_prefix("./")) {
                let target = format!("/tmp/{index}/requirements.txt");
                let mount = format!("--mount=type=bind,source={dir}/requirements.txt,target={target}");
                prop_assert!(flags.contains(&mount), "missing {} in {:?}", mount, flags);
                let pos = args.iter().position(|a| *a == target);
                prop_assert!(pos.is_some_and(|p| p > 0 && args[p - 1] == "-r"));
                index += 1;
            } else if let Some(rest) = raw.strip_prefix("./libs/") {
                let name = rest.trim_end_matches('/');
                let target = format!("/tmp/{index}/{name}");
                let copy = format!("COPY --link libs/{name} {target}");
                prop_assert!(copies.contains(&copy), "missing {} in {:?}", copy, copies);
                prop_assert_eq!(args.iter().filter(|a| **a == target).count(), 1);
                index += 1;
            }
        }

        prop_assert_eq!(plan.locals.len(), index);
        let requirements = plan.locals.len() - copies.len();
        let remote = plan.pypi.len() + plan.http.len() + plan.ssh.len();
        prop_assert_eq!(args.len(), 2 * requirements + copies.len() + remote);
        prop_assert_eq!(plan.locals.len() + remote, declarations.len());
    }

    #[test]
    fn rendering_is_deterministic(
        declarations in proptest::collection::vec(declaration(), 0..8),
        env in proptest::collection::btree_map("[A-Z][A-Z_]{0,8}", "[a-z0-9 ]{0,8}", 0..5),
        arm in any::<bool>(),
    ) {
        let config = MopyConfig {
            python_version: "3.9.18".to_owned(),
            pip: declarations,
            env,
            project: Some("./app.py".to_owned()),
            ..Default::default()
        };
        let arch = if arm { Arch::Arm64 } else { Arch::Amd64 };

        let first = DockerfileGenerator::new(&config, arch.clone()).render();
        let second = DockerfileGenerator::new(&config, arch).render();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn empty_plan_never_installs(apt in proptest::collection::vec("[a-z]{1,8}", 0..4)) {
        let config = MopyConfig { apt, ..Default::default() };
        let output = DockerfileGenerator::new(&config, Arch::Amd64).render();
        prop_assert!(!output.contains("pip install"));
        prop_assert!(!output.contains("COPY --link"));
        prop_assert!(!output.contains("COPY --from=builder"));
    }
}

// ── Eject ──

#[test]
fn eject_writes_dockerfile() {
    let tmp = TempDir::new().unwrap();
    assert!(!is_ejected(tmp.path()));

    let path = eject(tmp.path(), "FROM python\n").unwrap();

    assert_eq!(path, tmp.path().join("Dockerfile"));
    assert!(is_ejected(tmp.path()));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "FROM python\n");
}

#[test]
fn eject_refuses_to_overwrite() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("Dockerfile"), "hand edited").unwrap();

    let err = eject(tmp.path(), "FROM python\n").unwrap_err();

    assert!(matches!(err, EjectError::AlreadyEjected(_)));
    assert!(err.to_string().contains("already exists"));
    let content = std::fs::read_to_string(tmp.path().join("Dockerfile")).unwrap();
    assert_eq!(content, "hand edited");
}

#[test]
fn write_dockerfile_creates_parents_and_overwrites() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("build/docker/Dockerfile");

    write_dockerfile(&path, "FROM a\n").unwrap();
    write_dockerfile(&path, "FROM b\n").unwrap();

    assert_eq!(std::fs::read_to_string(path).unwrap(), "FROM b\n");
}
