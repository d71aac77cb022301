//! `penwright templates`: List prompt templates.

use super::GlobalOpts;

pub async fn run(opts: &GlobalOpts) -> Result<(), Box<dyn std::error::Error>> {
    let config = opts.load_config()?;
    let catalog = super::template_catalog(&config);

    println!("Templates");
    println!("=========");
    for name in catalog.names() {
        let prefix = catalog.get(name).unwrap_or_default();
        println!("  {name:<20} {}", prefix.trim_end().replace('\n', " "));
    }
    println!("\n  Use \"{}\" for no template.", penwright_agent::NO_TEMPLATE);

    Ok(())
}
