//! Command dispatch and output formatting

use std::error::Error;

use parcel_core::{Parcel, ParcelError, ParcelService, ParcelStatus};

use crate::Command;

pub fn run(command: Command, service: &ParcelService<'_>, json: bool) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Register { client, address } => {
            let parcel = service.register(client, &address)?;
            print_parcels(&[parcel], json)?;
        }
        Command::Get { number } => {
            let parcel = service.store().get(number)?;
            print_parcels(&[parcel], json)?;
        }
        Command::List { client } => {
            let parcels = service.client_parcels(client)?;
            if parcels.is_empty() && !json {
                println!("client {client} has no parcels");
            } else {
                print_parcels(&parcels, json)?;
            }
        }
        Command::NextStatus { number } => {
            let status = service.next_status(number)?;
            println!("parcel {number} is now {status}");
        }
        Command::SetStatus { number, status } => {
            let status: ParcelStatus = status.parse().map_err(ParcelError::from)?;
            service.store().set_status(number, status)?;
            println!("parcel {number} is now {status}");
        }
        Command::SetAddress { number, address } => {
            service.change_address(number, &address)?;
            println!("parcel {number} will be delivered to {address}");
        }
        Command::Delete { number } => {
            service.delete(number)?;
            println!("parcel {number} deleted");
        }
    }

    Ok(())
}

fn print_parcels(parcels: &[Parcel], json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(parcels)?);
    } else {
        for parcel in parcels {
            println!("{parcel}");
        }
    }
    Ok(())
}
