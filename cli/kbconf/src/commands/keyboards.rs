//! `kbconf keyboards`: list keyboards in the project.

use anyhow::Result;

use crate::project::Project;

/// Print every keyboard that has a manifest.
pub fn list(project: &Project) -> Result<()> {
    let keyboards = project.keyboards()?;
    if keyboards.is_empty() {
        println!(
            "No keyboards found in {}",
            project.root.join(&project.config.paths.keyboards).display()
        );
        return Ok(());
    }
    println!("Keyboards:");
    println!();
    for name in &keyboards {
        println!("  {name}");
    }
    println!();
    println!("Use 'kbconf build -k <name>' to compile one.");
    Ok(())
}
