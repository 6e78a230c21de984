//! Multi-step workflows behind the CLI commands
//!
//! These functions hold the logic that spans the store, the renderer, the
//! packager and git, so they can be driven programmatically (and with mocks)
//! without depending on clap.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::domain::TagPattern;
use crate::error::Result;
use crate::git::Tagger;
use crate::packager::{PackageRequest, Packager};
use crate::render::{load_template, RenderConfig, TemplateRenderer};
use crate::store::{Outcome, VersionStore};

/// Result of a build workflow
#[derive(Debug, Clone, PartialEq)]
pub struct BuildResult {
    /// Counter update for the new build number
    pub outcome: Outcome,

    /// Rendered manifest, if a template is configured
    pub manifest: Option<PathBuf>,

    /// Whether a packager ran
    pub packaged: bool,
}

/// Result of a git tag workflow
#[derive(Debug, Clone, PartialEq)]
pub struct TagResult {
    pub tag: String,
    pub remote: String,
    pub pushed: bool,
}

/// Tokens for the manifest: configured statics, then the version and build number
pub fn manifest_tokens(config: &Config, outcome: &Outcome) -> RenderConfig {
    let mut tokens = config
        .render
        .tokens
        .iter()
        .fold(RenderConfig::new(), |acc, (key, value)| {
            acc.with(key.as_str(), value.as_str())
        });
    tokens.insert(
        config.render.version_token.clone(),
        outcome.current.version.to_string(),
    );
    tokens.insert("build_number", outcome.current.build_number.to_string());
    tokens
}

/// Build workflow
///
/// 1. Increment the build number (audited)
/// 2. Render the manifest template, if configured
/// 3. Run the packager, if one is given
///
/// Each step is fatal. The build number stays incremented when a later
/// step fails.
pub fn run_build_workflow(
    store: &VersionStore,
    config: &Config,
    packager: Option<&dyn Packager>,
    tag: Option<&str>,
) -> Result<BuildResult> {
    let outcome = store.increment_build_number(tag)?;

    let manifest = match (&config.render.template, &config.render.output) {
        (Some(template), Some(output)) => {
            let template = store.root().join(template);
            let output = store.root().join(output);
            let renderer = TemplateRenderer::new(manifest_tokens(config, &outcome));
            renderer.render_to(&template, &output)?;
            Some(output)
        }
        _ => {
            tracing::debug!("no manifest template configured, skipping render");
            None
        }
    };

    let packaged = match packager {
        Some(packager) => {
            let request = PackageRequest {
                working_dir: store.root().to_path_buf(),
                version: outcome.current.version,
                build_number: outcome.current.build_number,
                manifest: manifest.clone(),
            };
            packager.package(&request)?;
            true
        }
        None => {
            tracing::debug!("no packager configured, skipping packaging");
            false
        }
    };

    Ok(BuildResult {
        outcome,
        manifest,
        packaged,
    })
}

/// Tag the current version in git and optionally push it
pub fn run_gittag_workflow(
    store: &VersionStore,
    config: &Config,
    tagger: &dyn Tagger,
    remote: Option<&str>,
    push: bool,
) -> Result<TagResult> {
    let version = store.load_version()?;
    let pattern = TagPattern::new(config.git.tag_pattern.clone())?;
    let tag = pattern.format(&version);
    let remote = remote.unwrap_or(&config.git.remote).to_string();

    tagger.create_tag(&tag)?;
    tracing::info!(tag = %tag, "created tag");

    if push {
        tagger.push_tag(&tag, &remote)?;
    }

    Ok(TagResult {
        tag,
        remote,
        pushed: push,
    })
}

/// Standalone render: tokens and template each given as a path or literal text
///
/// Writes to `out` when given; always returns the rendered text.
pub fn run_render_workflow(
    config_input: &str,
    template_input: &str,
    out: Option<&Path>,
) -> Result<String> {
    let config = RenderConfig::load(config_input)?;
    let template = load_template(template_input)?;
    let rendered = TemplateRenderer::new(config).render_str(&template);
    if let Some(path) = out {
        std::fs::write(path, &rendered)?;
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BuildNumber, Version};
    use crate::git::MockTagger;
    use crate::packager::MockPackager;
    use std::fs;
    use tempfile::TempDir;

    fn project(version: &str, build: &str) -> (TempDir, VersionStore) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("VERSION"), version).unwrap();
        fs::write(dir.path().join(".build_num"), build).unwrap();
        let store = VersionStore::open(dir.path());
        (dir, store)
    }

    fn render_config() -> Config {
        let mut config = Config::default();
        config.render.template = Some("setup.cfg.in".to_string());
        config.render.output = Some("setup.cfg".to_string());
        config.render.tokens.insert("name".to_string(), "demo".to_string());
        config
    }

    #[test]
    fn test_build_renders_and_packages() {
        let (dir, store) = project("1.5.0\n", "1\n");
        fs::write(
            dir.path().join("setup.cfg.in"),
            "name = {{name}}\nversion = {{version}}\nbuild = {{build_number}}\n",
        )
        .unwrap();
        let packager = MockPackager::new();

        let result =
            run_build_workflow(&store, &render_config(), Some(&packager), Some("ci")).unwrap();

        assert_eq!(result.outcome.current.build_number, BuildNumber(2));
        assert!(result.packaged);
        assert_eq!(
            fs::read_to_string(dir.path().join("setup.cfg")).unwrap(),
            "name = demo\nversion = 1.5.0\nbuild = 2\n"
        );

        let requests = packager.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].version, Version::new(1, 5, 0));
        assert_eq!(requests[0].manifest, Some(dir.path().join("setup.cfg")));
    }

    #[test]
    fn test_build_without_render_or_packager_only_counts() {
        let (_dir, store) = project("0.1.0\n", "0\n");
        let result = run_build_workflow(&store, &Config::default(), None, None).unwrap();
        assert_eq!(result.manifest, None);
        assert!(!result.packaged);
        assert_eq!(store.load_build_number().unwrap(), BuildNumber(1));
    }

    #[test]
    fn test_render_failure_skips_packager_but_keeps_build_number() {
        let (_dir, store) = project("1.0.0\n", "4\n");
        let packager = MockPackager::new();

        let result = run_build_workflow(&store, &render_config(), Some(&packager), None);

        assert!(result.is_err());
        assert!(packager.requests().is_empty());
        assert_eq!(store.load_build_number().unwrap(), BuildNumber(5));
        assert_eq!(store.history(10).unwrap().len(), 1);
    }

    #[test]
    fn test_packager_failure_is_fatal() {
        let (_dir, store) = project("1.0.0\n", "0\n");
        let packager = MockPackager::failing("wheel build failed");
        let err = run_build_workflow(&store, &Config::default(), Some(&packager), None)
            .unwrap_err();
        assert!(err.to_string().contains("wheel build failed"));
    }

    #[test]
    fn test_custom_version_token() {
        let (_dir, store) = project("2.1.0\n", "0\n");
        let mut config = Config::default();
        config.render.version_token = "pkg_version".to_string();
        let outcome = store.increment_build_number(None).unwrap();
        let tokens = manifest_tokens(&config, &outcome);
        assert_eq!(tokens.get("pkg_version"), Some("2.1.0"));
        assert_eq!(tokens.get("build_number"), Some("1"));
        assert_eq!(tokens.get("version"), None);
    }

    #[test]
    fn test_gittag_creates_and_pushes() {
        let (_dir, store) = project("3.2.1\n", "9\n");
        let tagger = MockTagger::new();

        let result =
            run_gittag_workflow(&store, &Config::default(), &tagger, None, true).unwrap();

        assert_eq!(result.tag, "v3.2.1");
        assert_eq!(result.remote, "origin");
        assert!(result.pushed);
        assert_eq!(
            tagger.pushed(),
            vec![("v3.2.1".to_string(), "origin".to_string())]
        );
        assert!(store.history(10).unwrap().is_empty());
    }

    #[test]
    fn test_gittag_no_push_and_custom_remote() {
        let (_dir, store) = project("0.4.0\n", "0\n");
        let mut config = Config::default();
        config.git.tag_pattern = "release-{version}".to_string();
        let tagger = MockTagger::new();

        let result =
            run_gittag_workflow(&store, &config, &tagger, Some("upstream"), false).unwrap();

        assert_eq!(result.tag, "release-0.4.0");
        assert_eq!(result.remote, "upstream");
        assert!(!result.pushed);
        assert_eq!(tagger.tags(), vec!["release-0.4.0".to_string()]);
        assert!(tagger.pushed().is_empty());
    }

    #[test]
    fn test_gittag_existing_tag_fails() {
        let (_dir, store) = project("1.0.0\n", "0\n");
        let tagger = MockTagger::new();
        tagger.add_tag("v1.0.0");
        assert!(run_gittag_workflow(&store, &Config::default(), &tagger, None, true).is_err());
        assert!(tagger.pushed().is_empty());
    }

    #[test]
    fn test_render_workflow_literal_inputs() {
        let rendered =
            run_render_workflow(r#"{"version": "1.2.3"}"#, "v={{version}}", None).unwrap();
        assert_eq!(rendered, "v=1.2.3");
    }

    #[test]
    fn test_render_workflow_writes_out() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.txt");
        run_render_workflow(r#"{"a": 1}"#, "{{a}}{{a}}", Some(&out)).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "11");
    }
}
