//! Compose document with in-place image rewriting

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::compose::error::ComposeError;
use crate::compose::options::ServiceOptions;
use crate::compose::parser::ComposeParser;
use crate::compose::service::Service;
use crate::update::orchestrator::update_services;
use crate::update::summary::Summary;
use crate::version::error::UpdateError;
use crate::version::image::VersionedImage;
use crate::version::registry::Registry;
use crate::version::selector::TagDenylist;

/// Where to write the document after processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Overwrite the file the document was loaded from
    Original,
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// Interpret the `--out` argument: none means the original file, `-` means
    /// stdout, anything else is a path.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some("") => OutputTarget::Original,
            Some("-") => OutputTarget::Stdout,
            Some(path) => OutputTarget::File(PathBuf::from(path)),
        }
    }
}

/// A compose file and the services found in it
///
/// The source text is kept as-is (apart from line ending normalization) and
/// only the image references are spliced, so comments, quoting and layout
/// survive an update.
#[derive(Debug)]
pub struct ComposeDocument {
    path: Option<PathBuf>,
    content: String,
    services: Vec<Service>,
}

impl ComposeDocument {
    /// Read and parse a compose file
    pub fn load(path: &Path) -> Result<Self, ComposeError> {
        let content = std::fs::read_to_string(path).map_err(|source| ComposeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut document = Self::from_content(&content)?;
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    /// Parse compose content that is not backed by a file
    pub fn from_content(content: &str) -> Result<Self, ComposeError> {
        let content = content.replace("\r\n", "\n");
        let entries = ComposeParser::new().parse(&content)?;

        let services = entries
            .into_iter()
            .map(|entry| {
                let image = VersionedImage::parse(&entry.image).map_err(|source| {
                    ComposeError::InvalidImage {
                        service: entry.service.clone(),
                        line: entry.line + 1,
                        source,
                    }
                })?;
                let options = ServiceOptions::from_comments(&entry.head_comment, &entry.line_comment);
                Ok(Service::new(
                    &entry.service,
                    image,
                    options,
                    entry.span,
                    entry.line,
                ))
            })
            .collect::<Result<Vec<_>, ComposeError>>()?;

        debug!("Parsed {} services with images", services.len());
        Ok(Self {
            path: None,
            content,
            services,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current document text
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Look up the latest matching versions and rewrite the image references.
    ///
    /// Services that resolved are rewritten even if another service failed;
    /// the first failure is returned afterwards.
    pub async fn update_versions(
        &mut self,
        registry: &dyn Registry,
        denylist: &TagDenylist,
    ) -> Result<(), UpdateError> {
        let result = update_services(&mut self.services, registry, denylist).await;
        let applied = self.apply_updates();
        info!("Rewrote {} image references", applied);
        result
    }

    /// Splice the latest image of every resolved service into the content.
    ///
    /// Returns the number of references whose text changed.
    pub fn apply_updates(&mut self) -> usize {
        let mut order: Vec<usize> = (0..self.services.len()).collect();
        order.sort_by_key(|&i| self.services[i].span().start);

        let mut content = String::with_capacity(self.content.len());
        let mut cursor = 0;
        let mut applied = 0;

        for i in order {
            let service = &mut self.services[i];
            let span = service.span().clone();
            content.push_str(&self.content[cursor..span.start]);

            let start = content.len();
            let original = &self.content[span.clone()];
            match service.latest().map(ToString::to_string) {
                Some(replacement) if replacement != original => {
                    content.push_str(&replacement);
                    applied += 1;
                }
                _ => content.push_str(original),
            }
            service.set_span(start..content.len());
            cursor = span.end;
        }
        content.push_str(&self.content[cursor..]);

        self.content = content;
        applied
    }

    pub fn summary(&self) -> Summary {
        Summary::from_services(&self.services)
    }

    pub fn write(&self, target: &OutputTarget) -> Result<(), ComposeError> {
        match target {
            OutputTarget::Original => self.write_to_original_file(),
            OutputTarget::Stdout => self.write_to_stdout(),
            OutputTarget::File(path) => self.write_to_file(path),
        }
    }

    pub fn write_to_original_file(&self) -> Result<(), ComposeError> {
        let path = self.path.as_deref().ok_or(ComposeError::NoOriginalFile)?;
        self.write_to_file(path)
    }

    pub fn write_to_file(&self, path: &Path) -> Result<(), ComposeError> {
        std::fs::write(path, &self.content).map_err(|source| ComposeError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write_to_stdout(&self) -> Result<(), ComposeError> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(self.content.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|source| ComposeError::Write {
                path: PathBuf::from("-"),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::registry::MockRegistry;
    use rstest::rstest;

    const COMPOSE: &str = r#"# Production stack
services:
  web:
    # impose:minor
    image: "nginx:1.24.0"  # front proxy
    ports:
      - "80:80"
  db:
    image: mariadb:10.5.13-jammy # impose:patch impose:warnPatch
  app:
    build: .
  legacy:
    image: some/legacy:2.0 # impose:ignore
"#;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(None, OutputTarget::Original)]
    #[case(Some(""), OutputTarget::Original)]
    #[case(Some("-"), OutputTarget::Stdout)]
    #[case(Some("out.yml"), OutputTarget::File(PathBuf::from("out.yml")))]
    fn output_target_from_arg(#[case] arg: Option<&str>, #[case] expected: OutputTarget) {
        assert_eq!(OutputTarget::from_arg(arg), expected);
    }

    #[test]
    fn from_content_resolves_services_and_options() {
        let document = ComposeDocument::from_content(COMPOSE).unwrap();
        let services = document.services();

        assert_eq!(services.len(), 3);
        assert_eq!(services[0].name(), "web");
        assert_eq!(services[0].current().to_string(), "nginx:1.24.0");
        assert!(services[0].options().only_minor);
        assert_eq!(services[1].name(), "db");
        assert!(services[1].options().only_patch);
        assert!(services[1].options().warn_patch);
        assert_eq!(services[2].name(), "legacy");
        assert!(services[2].options().ignore);
    }

    #[test]
    fn from_content_normalizes_line_endings() {
        let document =
            ComposeDocument::from_content("services:\r\n  web:\r\n    image: nginx:1.0\r\n")
                .unwrap();

        assert_eq!(
            document.content(),
            "services:\n  web:\n    image: nginx:1.0\n"
        );
    }

    #[test]
    fn from_content_rejects_empty_image_name() {
        let result = ComposeDocument::from_content("services:\n  web:\n    image: \":1.0\"\n");

        assert!(matches!(
            result,
            Err(ComposeError::InvalidImage { service, line: 3, .. }) if service == "web"
        ));
    }

    #[tokio::test]
    async fn update_versions_rewrites_images_in_place() {
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_tag_names()
            .withf(|name| name == "library/nginx")
            .returning(|_| Ok(tags(&["1.24.0", "1.25.3", "2.0.0", "latest"])));
        registry
            .expect_fetch_tag_names()
            .withf(|name| name == "library/mariadb")
            .returning(|_| {
                Ok(tags(&[
                    "10.5.13-jammy",
                    "10.5.21-jammy",
                    "10.6.1-jammy",
                    "10.5.22-focal",
                ]))
            });

        let mut document = ComposeDocument::from_content(COMPOSE).unwrap();
        document
            .update_versions(&registry, &TagDenylist::default())
            .await
            .unwrap();

        assert_eq!(
            document.content(),
            COMPOSE
                .replace("nginx:1.24.0", "nginx:1.25.3")
                .replace("mariadb:10.5.13-jammy", "mariadb:10.5.21-jammy")
        );

        let summary = document.summary();
        assert_eq!(summary.changed.len(), 2);
        assert_eq!(summary.warnings.len(), 1);
        assert_eq!(summary.warnings[0].service, "db");
    }

    #[tokio::test]
    async fn update_versions_applies_successful_services_on_failure() {
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_tag_names()
            .withf(|name| name == "library/nginx")
            .returning(|_| Ok(tags(&["1.25.3"])));
        registry
            .expect_fetch_tag_names()
            .withf(|name| name == "library/mariadb")
            .returning(|_| Ok(tags(&["11.0.0"])));

        let mut document = ComposeDocument::from_content(COMPOSE).unwrap();
        let result = document
            .update_versions(&registry, &TagDenylist::default())
            .await;

        assert!(matches!(result, Err(UpdateError::NoMatchingVersion(name)) if name == "mariadb:10.5.13-jammy"));
        assert!(document.content().contains("image: \"nginx:1.25.3\"  # front proxy"));
        assert!(document.content().contains("image: mariadb:10.5.13-jammy"));
    }

    #[test]
    fn apply_updates_handles_length_changes() {
        let content = "services:\n  a:\n    image: a:1\n  b:\n    image: b:1.0.0\n";
        let mut document = ComposeDocument::from_content(content).unwrap();

        let a = document.services[0].current().with_version("10");
        let b = document.services[1].current().with_version("1.0.1");
        document.services[0].set_latest(a);
        document.services[1].set_latest(b);

        assert_eq!(document.apply_updates(), 2);
        assert_eq!(
            document.content(),
            "services:\n  a:\n    image: a:10\n  b:\n    image: b:1.0.1\n"
        );
        assert_eq!(&document.content()[document.services[1].span().clone()], "b:1.0.1");

        // Applying again is a no-op
        assert_eq!(document.apply_updates(), 0);
    }

    #[test]
    fn write_to_file_and_original_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("docker-compose.yml");
        std::fs::write(&path, "services:\r\n  web:\r\n    image: nginx:1.0\r\n").unwrap();

        let document = ComposeDocument::load(&path).unwrap();
        assert_eq!(document.path(), Some(path.as_path()));

        document.write(&OutputTarget::Original).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "services:\n  web:\n    image: nginx:1.0\n"
        );

        let out = dir.path().join("out.yml");
        document.write(&OutputTarget::File(out.clone())).unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            document.content()
        );
    }

    #[test]
    fn write_to_original_file_requires_path() {
        let document = ComposeDocument::from_content("services:\n  web:\n    image: nginx\n").unwrap();

        assert!(matches!(
            document.write_to_original_file(),
            Err(ComposeError::NoOriginalFile)
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = ComposeDocument::load(&dir.path().join("missing.yml"));

        assert!(matches!(result, Err(ComposeError::Read { .. })));
    }
}
