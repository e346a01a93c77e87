use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::aggregate::DashboardSeries;
use crate::render::charts::Panel;

/// Page shell; `{{panels}}` is replaced with one block per rendered chart.
/// Layout and palette follow the upstream dashboard page.
const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Sales dashboard</title>
<style>
  body { background-color: #f0f0f0; font-family: sans-serif; margin: 0; padding: 20px; }
  header { text-align: center; margin-bottom: 20px; }
  header h1 { color: #333; }
  header p { font-size: 18px; color: #666; }
  .panels { display: flex; flex-wrap: wrap; justify-content: space-around; }
  .panel { width: 30%; min-width: 420px; margin: 10px; padding: 10px;
           border: 1px solid #ccc; border-radius: 5px; background-color: #fff; }
  .panel h4 { text-align: center; }
  .panel img { width: 100%; }
</style>
</head>
<body>
<header>
  <h1>Sales dashboard</h1>
  <p>Derived views over one uploaded sales table.</p>
</header>
<div class="panels">
{{panels}}</div>
</body>
</html>
"#;

/// Compose the rendered panels into a static page next to the chart files.
pub fn write_dashboard(out_dir: &Path, panels: &[Panel]) -> Result<PathBuf> {
    let mut blocks = String::new();
    for panel in panels {
        blocks.push_str(&format!(
            "  <div class=\"panel\"><h4>{title}</h4><img src=\"{file}\" alt=\"{title}\"></div>\n",
            title = panel.title,
            file = panel.file,
        ));
    }

    let path = out_dir.join("index.html");
    fs::write(&path, PAGE_TEMPLATE.replace("{{panels}}", &blocks))
        .with_context(|| format!("writing {}", path.display()))?;
    info!(page = %path.display(), panels = panels.len(), "dashboard page written");
    Ok(path)
}

/// Machine-readable export of all five series.
pub fn write_series_json(series: &DashboardSeries, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join("series.json");
    let json = serde_json::to_string_pretty(series).context("serializing series")?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
