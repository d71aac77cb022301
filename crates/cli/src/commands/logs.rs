//! `penwright logs`: Show audit records.

use super::GlobalOpts;
use penwright_core::UserIdentity;

pub async fn run(
    opts: &GlobalOpts,
    user: UserIdentity,
    all: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if all && !user.is_admin {
        return Err("--all requires --admin".into());
    }

    let config = opts.load_config()?;
    let store = super::open_audit(&config, opts.ephemeral).await?;

    let filter = if all { None } else { Some(user.username.as_str()) };
    let records = store.query(filter).await?;

    match filter {
        Some(name) => println!("Interaction history for {name}"),
        None => println!("Interaction history (all users)"),
    }
    super::print_records(&records);

    Ok(())
}
