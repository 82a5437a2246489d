use crate::domain::model::GraphFormat;
use crate::utils::error::Result;
use std::path::Path;

/// 將 DOT 文字轉成圖檔的外部工具
pub trait GraphRenderer {
    fn render(&self, dot_source: &str, format: GraphFormat, output_path: &Path) -> Result<()>;
}
