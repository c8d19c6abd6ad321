//! Docker Compose file parser

use std::ops::Range;

use tracing::{debug, warn};

use crate::compose::error::ComposeError;

/// An `image` entry of a service as written in the compose file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Service name (key under `services`)
    pub service: String,
    /// Image reference with quotes removed (e.g. "nginx:1.25")
    pub image: String,
    /// Byte range of the image reference in the source, quotes excluded
    pub span: Range<usize>,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed)
    pub column: usize,
    /// Comment lines directly above the `image` key
    pub head_comment: String,
    /// Comment after the value on the same line
    pub line_comment: String,
}

/// Parser for Docker Compose files (compose.yaml, docker-compose.yml)
pub struct ComposeParser;

impl ComposeParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ComposeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposeParser {
    /// Extract the `image` entries of all services in document order.
    ///
    /// Services without an `image` key (e.g. build-only services) are skipped.
    pub fn parse(&self, content: &str) -> Result<Vec<ImageEntry>, ComposeError> {
        let mut parser = tree_sitter::Parser::new();
        let language = tree_sitter_yaml::LANGUAGE;
        parser.set_language(&language.into()).map_err(|e| {
            warn!("Failed to set YAML language for tree-sitter: {}", e);
            ComposeError::TreeSitter(e.to_string())
        })?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| ComposeError::InvalidYaml("failed to parse YAML".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ComposeError::InvalidYaml(format!(
                "syntax error near line {}",
                first_error_line(root) + 1
            )));
        }

        let top_level = find_mapping(root).ok_or(ComposeError::MissingServices)?;
        let services = self
            .find_value(top_level, "services", content)
            .and_then(find_mapping)
            .ok_or(ComposeError::MissingServices)?;

        let mut results = Vec::new();
        for pair in mapping_pairs(services) {
            let (Some(key_node), Some(value_node)) = (
                pair.child_by_field_name("key"),
                pair.child_by_field_name("value"),
            ) else {
                continue;
            };
            let service = self.get_node_text(key_node, content);

            let Some(image_node) = find_mapping(value_node)
                .and_then(|mapping| self.find_pair(mapping, "image", content))
            else {
                debug!("Service '{}' has no image, skipping", service);
                continue;
            };

            if let Some(entry) = self.parse_image_pair(service, image_node, content) {
                results.push(entry);
            }
        }

        Ok(results)
    }

    /// Find the pair with the given key in a mapping node
    fn find_pair<'a>(
        &self,
        mapping: tree_sitter::Node<'a>,
        key: &str,
        content: &str,
    ) -> Option<tree_sitter::Node<'a>> {
        mapping_pairs(mapping).into_iter().find(|pair| {
            pair.child_by_field_name("key")
                .is_some_and(|k| self.get_node_text(k, content) == key)
        })
    }

    fn find_value<'a>(
        &self,
        mapping: tree_sitter::Node<'a>,
        key: &str,
        content: &str,
    ) -> Option<tree_sitter::Node<'a>> {
        self.find_pair(mapping, key, content)?
            .child_by_field_name("value")
    }

    /// Build an [`ImageEntry`] from an `image: <value>` pair
    ///
    /// YAML tree structure:
    /// ```text
    /// block_mapping_pair              <- "image: nginx:1.25 # comment"
    ///   flow_node                     <- key: "image"
    ///   flow_node                     <- value
    ///     plain_scalar                <- nginx:1.25
    ///     | double_quote_scalar       <- "nginx:1.25"
    ///     | single_quote_scalar       <- 'nginx:1.25'
    /// ```
    fn parse_image_pair(
        &self,
        service: String,
        pair: tree_sitter::Node,
        content: &str,
    ) -> Option<ImageEntry> {
        let Some(value_node) = pair.child_by_field_name("value") else {
            warn!("Service '{}' has an empty image", service);
            return None;
        };

        let scalar = scalar_child(value_node)?;
        let range = scalar.byte_range();
        let span = match scalar.kind() {
            "double_quote_scalar" | "single_quote_scalar" if range.len() >= 2 => {
                range.start + 1..range.end - 1
            }
            _ => range,
        };

        let start_point = scalar.start_position();
        let column = start_point.column + (span.start - scalar.start_byte());

        Some(ImageEntry {
            service,
            image: content[span.clone()].to_string(),
            line: start_point.row,
            column,
            head_comment: head_comment(content, pair.start_byte()),
            line_comment: line_comment(content, scalar.end_byte()),
            span,
        })
    }

    /// Get text content of a node, removing quotes if present
    fn get_node_text(&self, node: tree_sitter::Node, content: &str) -> String {
        let text = &content[node.byte_range()];
        text.trim()
            .trim_start_matches('"')
            .trim_end_matches('"')
            .trim_start_matches('\'')
            .trim_end_matches('\'')
            .to_string()
    }
}

/// Descend through stream/document/node wrappers to the first mapping
fn find_mapping(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    match node.kind() {
        "block_mapping" | "flow_mapping" => Some(node),
        "stream" | "document" | "block_node" | "flow_node" => {
            let mut cursor = node.walk();
            let children: Vec<_> = node.named_children(&mut cursor).collect();
            children.into_iter().find_map(find_mapping)
        }
        _ => None,
    }
}

/// Key/value pairs of a block or flow mapping
fn mapping_pairs(mapping: tree_sitter::Node) -> Vec<tree_sitter::Node> {
    let mut cursor = mapping.walk();
    mapping
        .named_children(&mut cursor)
        .filter(|child| matches!(child.kind(), "block_mapping_pair" | "flow_pair"))
        .collect()
}

/// Scalar inside a value node, or None if the value is not a scalar
fn scalar_child(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    match node.kind() {
        "plain_scalar" | "double_quote_scalar" | "single_quote_scalar" => Some(node),
        "flow_node" => {
            let mut cursor = node.walk();
            let children: Vec<_> = node.named_children(&mut cursor).collect();
            children.into_iter().find_map(scalar_child)
        }
        _ => None,
    }
}

fn first_error_line(node: tree_sitter::Node) -> usize {
    if node.is_error() || node.is_missing() {
        return node.start_position().row;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find(|child| child.has_error())
        .map_or(node.start_position().row, first_error_line)
}

/// Consecutive comment lines directly above the line containing `offset`
fn head_comment(content: &str, offset: usize) -> String {
    let line_start = content[..offset].rfind('\n').map_or(0, |p| p + 1);
    if line_start == 0 {
        return String::new();
    }

    let mut comments: Vec<&str> = content[..line_start - 1]
        .lines()
        .rev()
        .map(str::trim)
        .take_while(|line| line.starts_with('#'))
        .collect();
    comments.reverse();
    comments.join("\n")
}

/// Comment following `offset` on the same line
fn line_comment(content: &str, offset: usize) -> String {
    let line_end = content[offset..]
        .find('\n')
        .map_or(content.len(), |p| offset + p);
    let rest = content[offset..line_end].trim();
    if rest.starts_with('#') {
        rest.to_string()
    } else {
        String::new()
    }
}
