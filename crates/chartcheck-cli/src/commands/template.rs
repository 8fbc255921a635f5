//! Template command - render the chart and list what it produced

use console::style;

use crate::commands::RenderArgs;
use crate::display;
use crate::error::Result;

pub fn run(release: &str, render: &RenderArgs, raw: bool) -> Result<()> {
    let output = render.render(release)?;

    if raw {
        print!("{}", output);
        return Ok(());
    }

    let manifest = chartcheck_kube::Manifest::parse(&output);
    println!(
        "{} Rendered release {}",
        style("✓").green().bold(),
        style(release).cyan()
    );
    println!();
    print!("{}", display::summary(&manifest));
    Ok(())
}
