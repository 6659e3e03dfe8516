//! Built-in file tools backed by a [`FileGatekeeper`].

use crate::Tool;
use crate::builtins::utils::{parse_args, to_payload};
use crate::files::{FileGatekeeper, TextEncoding};
use agentos_rs_protocol::{ToolError, ToolResult};
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateArgs {
    filename: String,
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReadArgs {
    filename: String,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    max_lines: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListArgs {
    #[serde(default)]
    pattern: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FilenameArgs {
    filename: String,
}

fn filename_property() -> Value {
    json!({
        "type": "string",
        "description": "File name inside the sandbox directory; separators and '..' are stripped"
    })
}

fn encoding_property() -> Value {
    json!({
        "type": "string",
        "enum": ["utf-8", "ascii", "latin-1"],
        "default": "utf-8"
    })
}

fn filename_only_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "filename": filename_property() },
        "required": ["filename"],
        "additionalProperties": false
    })
}

/// Write a text file with an allowed extension.
#[derive(Debug, Clone)]
pub struct CreateFileTool {
    files: Arc<FileGatekeeper>,
}

impl CreateFileTool {
    pub fn new(files: Arc<FileGatekeeper>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for CreateFileTool {
    fn name(&self) -> &str {
        "create_file"
    }

    fn description(&self) -> &str {
        "Create or overwrite a text file in the sandbox directory"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filename": filename_property(),
                "content": { "type": "string" },
                "encoding": encoding_property()
            },
            "required": ["filename", "content"],
            "additionalProperties": false
        })
    }

    async fn call(&self, args: Value) -> Result<ToolResult, ToolError> {
        let input: CreateArgs = parse_args(args)?;
        let encoding = TextEncoding::from_label(input.encoding.as_deref())?;
        let created = self.files.create(&input.filename, &input.content, encoding)?;
        Ok(ToolResult::ok(to_payload(&created)?))
    }
}

/// Read a file, optionally only its first lines.
#[derive(Debug, Clone)]
pub struct ReadFileTool {
    files: Arc<FileGatekeeper>,
}

impl ReadFileTool {
    pub fn new(files: Arc<FileGatekeeper>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a text file from the sandbox directory"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filename": filename_property(),
                "encoding": encoding_property(),
                "max_lines": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Return only the first N lines, 0 or absent reads the whole file"
                }
            },
            "required": ["filename"],
            "additionalProperties": false
        })
    }

    async fn call(&self, args: Value) -> Result<ToolResult, ToolError> {
        let input: ReadArgs = parse_args(args)?;
        let encoding = TextEncoding::from_label(input.encoding.as_deref())?;
        let content = self.files.read(&input.filename, encoding, input.max_lines)?;
        Ok(ToolResult::ok(to_payload(&content)?))
    }
}

/// List files matching a glob.
#[derive(Debug, Clone)]
pub struct ListFilesTool {
    files: Arc<FileGatekeeper>,
}

impl ListFilesTool {
    pub fn new(files: Arc<FileGatekeeper>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List files in the sandbox directory matching a glob pattern"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "default": "*",
                    "description": "Glob relative to the sandbox directory; '**' recurses"
                }
            },
            "additionalProperties": false
        })
    }

    async fn call(&self, args: Value) -> Result<ToolResult, ToolError> {
        let input: ListArgs = parse_args(args)?;
        let listing = self.files.list(input.pattern.as_deref())?;
        debug!("list_files matched (count={})", listing.count);
        Ok(ToolResult::ok(to_payload(&listing)?))
    }
}

/// Delete a single file.
#[derive(Debug, Clone)]
pub struct DeleteFileTool {
    files: Arc<FileGatekeeper>,
}

impl DeleteFileTool {
    pub fn new(files: Arc<FileGatekeeper>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for DeleteFileTool {
    fn name(&self) -> &str {
        "delete_file"
    }

    fn description(&self) -> &str {
        "Delete a file from the sandbox directory"
    }

    fn args_schema(&self) -> Value {
        filename_only_schema()
    }

    async fn call(&self, args: Value) -> Result<ToolResult, ToolError> {
        let input: FilenameArgs = parse_args(args)?;
        let deleted = self.files.delete(&input.filename)?;
        Ok(ToolResult::ok(to_payload(&deleted)?))
    }
}

/// Size, modification time and MIME type of a file.
#[derive(Debug, Clone)]
pub struct GetFileInfoTool {
    files: Arc<FileGatekeeper>,
}

impl GetFileInfoTool {
    pub fn new(files: Arc<FileGatekeeper>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for GetFileInfoTool {
    fn name(&self) -> &str {
        "get_file_info"
    }

    fn description(&self) -> &str {
        "Report size, modification time and MIME type of a file"
    }

    fn args_schema(&self) -> Value {
        filename_only_schema()
    }

    async fn call(&self, args: Value) -> Result<ToolResult, ToolError> {
        let input: FilenameArgs = parse_args(args)?;
        let info = self.files.info(&input.filename)?;
        Ok(ToolResult::ok(json!({ "info": to_payload(&info)? })))
    }
}

#[cfg(test)]
mod tests {
    use super::{CreateFileTool, DeleteFileTool, GetFileInfoTool, ListFilesTool, ReadFileTool};
    use crate::Tool;
    use crate::files::{FileGatekeeper, FilePolicy};
    use agentos_rs_config::FilesConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn files() -> (TempDir, Arc<FileGatekeeper>) {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = FilesConfig {
            base_directory: temp.path().join("files"),
            ..FilesConfig::default()
        };
        let policy = FilePolicy::from_config(&config).expect("policy");
        let files = FileGatekeeper::new(policy).expect("gatekeeper");
        (temp, Arc::new(files))
    }

    #[tokio::test]
    async fn create_then_read_round_trip() {
        let (_temp, files) = files();
        let created = CreateFileTool::new(files.clone())
            .invoke(json!({ "filename": "notes.txt", "content": "hello" }))
            .await;
        assert!(created.success, "{created:?}");
        assert_eq!(created.get("size"), Some(&json!(5)));

        let read = ReadFileTool::new(files)
            .invoke(json!({ "filename": "notes.txt" }))
            .await;
        assert!(read.success, "{read:?}");
        assert_eq!(read.get("content"), Some(&json!("hello")));
        assert_eq!(read.get("size"), Some(&json!(5)));
    }

    #[tokio::test]
    async fn disallowed_extension_is_reported() {
        let (temp, files) = files();
        let result = CreateFileTool::new(files)
            .invoke(json!({ "filename": "notes.exe", "content": "MZ" }))
            .await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Extension not allowed"));
        assert!(!temp.path().join("files").join("notes.exe").exists());
    }

    #[tokio::test]
    async fn unknown_encoding_is_invalid_arguments() {
        let (_temp, files) = files();
        let result = ReadFileTool::new(files)
            .invoke(json!({ "filename": "notes.txt", "encoding": "utf-16" }))
            .await;
        assert!(!result.success);
        assert_eq!(result.error_kind.as_deref(), Some("invalid_arguments"));
    }

    #[tokio::test]
    async fn missing_files_are_not_found() {
        let (_temp, files) = files();
        for tool in [
            Box::new(ReadFileTool::new(files.clone())) as Box<dyn Tool>,
            Box::new(DeleteFileTool::new(files.clone())),
            Box::new(GetFileInfoTool::new(files.clone())),
        ] {
            let result = tool.invoke(json!({ "filename": "absent.txt" })).await;
            assert_eq!(result.error.as_deref(), Some("Not found"), "{}", tool.name());
            assert_eq!(result.error_kind.as_deref(), Some("not_found"));
        }
    }

    #[tokio::test]
    async fn list_info_and_delete() {
        let (_temp, files) = files();
        let create = CreateFileTool::new(files.clone());
        for name in ["b.md", "a.txt"] {
            let result = create
                .invoke(json!({ "filename": name, "content": "x" }))
                .await;
            assert!(result.success);
        }

        let listing = ListFilesTool::new(files.clone()).invoke(json!({})).await;
        assert_eq!(listing.get("count"), Some(&json!(2)));
        assert_eq!(
            listing.get("files"),
            Some(&json!([{ "name": "a.txt", "size": 1 }, { "name": "b.md", "size": 1 }]))
        );

        let info = GetFileInfoTool::new(files.clone())
            .invoke(json!({ "filename": "a.txt" }))
            .await;
        let details = info.get("info").expect("info");
        assert_eq!(details["name"], json!("a.txt"));
        assert_eq!(details["mime"], json!("text/plain"));

        let deleted = DeleteFileTool::new(files.clone())
            .invoke(json!({ "filename": "a.txt" }))
            .await;
        assert_eq!(deleted.get("size_freed"), Some(&json!(1)));
        let listing = ListFilesTool::new(files)
            .invoke(json!({ "pattern": "*.txt" }))
            .await;
        assert_eq!(listing.get("count"), Some(&json!(0)));
    }
}
