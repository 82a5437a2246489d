use crate::domain::model::GraphFormat;
use crate::domain::ports::GraphRenderer;
use crate::utils::error::{EcUtilsError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// 透過 Graphviz 的 `dot` 執行檔繪圖
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    binary: PathBuf,
}

impl GraphvizRenderer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl GraphRenderer for GraphvizRenderer {
    fn render(&self, dot_source: &str, format: GraphFormat, output_path: &Path) -> Result<()> {
        let format_flag = match format {
            GraphFormat::Png => "-Tpng",
            GraphFormat::Dot => "-Tdot",
        };

        tracing::debug!(
            "Running {} {} -o {}",
            self.binary.display(),
            format_flag,
            output_path.display()
        );

        let mut child = Command::new(&self.binary)
            .arg(format_flag)
            .arg("-o")
            .arg(output_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EcUtilsError::RenderError {
                message: format!("failed to run '{}': {}", self.binary.display(), e),
            })?;

        // 程式可能沒讀完 stdin 就結束，先收集 stderr 再回報寫入錯誤
        let sent = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(dot_source.as_bytes()),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| EcUtilsError::RenderError {
                message: format!("failed to wait for '{}': {}", self.binary.display(), e),
            })?;
        if !output.status.success() {
            return Err(EcUtilsError::RenderError {
                message: format!(
                    "'{}' exited with {}: {}",
                    self.binary.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        if let Err(e) = sent {
            return Err(EcUtilsError::RenderError {
                message: format!(
                    "'{}' did not read the graph: {}",
                    self.binary.display(),
                    e
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_binary_is_a_render_error() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = GraphvizRenderer::new("/nonexistent/graphviz/dot");
        let result = renderer.render(
            "digraph { a -> b }",
            GraphFormat::Png,
            &temp_dir.path().join("graph.png"),
        );
        assert!(matches!(result, Err(EcUtilsError::RenderError { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_binary_exiting_early_is_a_render_error() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("graph.png");
        // 大於 pipe 緩衝區，`true` 不讀 stdin 就結束
        let dot_source = format!("digraph {{\n{}}}\n", "    a -> b;\n".repeat(100_000));

        let result = GraphvizRenderer::new("true").render(&dot_source, GraphFormat::Png, &output);
        assert!(matches!(result, Err(EcUtilsError::RenderError { .. })));

        let result = GraphvizRenderer::new("false").render("digraph {}", GraphFormat::Png, &output);
        match result {
            Err(EcUtilsError::RenderError { message }) => assert!(message.contains("exited with")),
            other => panic!("expected RenderError, got {:?}", other),
        }
    }

    #[test]
    fn test_default_binary() {
        assert_eq!(GraphvizRenderer::default().binary(), Path::new("dot"));
    }
}
