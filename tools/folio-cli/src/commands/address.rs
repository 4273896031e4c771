//! Address book commands.

use anyhow::Result;
use folio_commerce::address::{Address, AddressPatch, NewAddress, PostalAddress};
use folio_commerce::AddressId;

use super::{AddressArgs, AddressCommand, AddressFields};
use crate::context::Context;

/// Run the address command.
pub async fn run(args: AddressArgs, ctx: &Context) -> Result<()> {
    let owner = ctx.owner()?;
    let shop = ctx.open()?;
    let addresses = &shop.storefront.addresses;

    let changed = match args.command {
        Some(AddressCommand::List) | None => {
            let list = addresses.list(&owner).await?;
            print_addresses(&list, ctx);
            return Ok(());
        }
        Some(AddressCommand::Add { fields, default }) => {
            let mut new = NewAddress::new(fields.into_postal());
            new.is_default = default;
            let address = addresses.add(&owner, new).await?;
            ctx.output.success(&format!("Added address {}", address.id));
            address
        }
        Some(AddressCommand::Update {
            id,
            fields,
            default,
        }) => {
            let patch = fields.into_patch(default);
            let address = addresses
                .update(&owner, &AddressId::new(&id), patch)
                .await?;
            ctx.output.success(&format!("Updated address {}", address.id));
            address
        }
        Some(AddressCommand::Remove { id }) => {
            let address = addresses.remove(&owner, &AddressId::new(&id)).await?;
            ctx.output.success(&format!("Removed address {}", address.id));
            address
        }
        Some(AddressCommand::Default { id }) => {
            let address = addresses.set_default(&owner, &AddressId::new(&id)).await?;
            ctx.output
                .success(&format!("{} is now the default address", address.id));
            address
        }
    };

    shop.save().await?;
    if ctx.output.is_json() {
        ctx.output.json(&changed);
    }
    Ok(())
}

impl AddressFields {
    fn into_postal(self) -> PostalAddress {
        PostalAddress::new(
            self.name.unwrap_or_default(),
            self.street.unwrap_or_default(),
            self.city.unwrap_or_default(),
            self.state.unwrap_or_default(),
            self.postal_code.unwrap_or_default(),
            self.phone.unwrap_or_default(),
        )
    }

    fn into_patch(self, is_default: Option<bool>) -> AddressPatch {
        AddressPatch {
            name: self.name,
            street: self.street,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            phone: self.phone,
            is_default,
        }
    }
}

fn print_addresses(list: &[Address], ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&list);
        return;
    }

    if list.is_empty() {
        ctx.output.info("No saved addresses");
        ctx.output
            .info("Run `folio address add --name ... --street ...` to add one.");
        return;
    }

    ctx.output.header("Addresses");
    for address in list {
        let marker = if address.is_default { " (default)" } else { "" };
        ctx.output
            .list_item(&format!("{}{}", address.id, marker));
        ctx.output.kv("ship to", &address.postal.one_line());
        ctx.output.kv("phone", &address.postal.phone);
    }
}
