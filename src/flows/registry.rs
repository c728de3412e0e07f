use std::io;

use crate::console::{Console, Selection, prompt_until};
use crate::model::Id;
use crate::validate;

use super::{Session, report_error};

pub async fn register_client(session: &Session, console: &mut dyn Console) -> io::Result<Option<Id>> {
    console.write_line("\n--- Register new client ---").await?;
    let Selection::Selected(given_name) = prompt_until(console, "Given name(s): ", |s| {
        validate::person_name(s, "given name")
    })
    .await?
    else {
        return Ok(None);
    };
    let Selection::Selected(surname) =
        prompt_until(console, "Surname(s): ", |s| validate::person_name(s, "surname")).await?
    else {
        return Ok(None);
    };

    match session.engine.register_client(&given_name, &surname).await {
        Ok(id) => {
            console.write_line(&format!("Client registered. Id: {id}")).await?;
            Ok(Some(id))
        }
        Err(e) => {
            report_error(console, &e).await?;
            Ok(None)
        }
    }
}

pub async fn register_room(session: &Session, console: &mut dyn Console) -> io::Result<Option<Id>> {
    console.write_line("\n--- Register new room ---").await?;
    let Selection::Selected(name) =
        prompt_until(console, "Room name: ", validate::room_name).await?
    else {
        return Ok(None);
    };
    let Selection::Selected(capacity) =
        prompt_until(console, "Maximum capacity: ", validate::parse_capacity).await?
    else {
        return Ok(None);
    };

    match session.engine.register_room(&name, capacity).await {
        Ok(id) => {
            console.write_line(&format!("Room registered. Id: {id}")).await?;
            Ok(Some(id))
        }
        Err(e) => {
            report_error(console, &e).await?;
            Ok(None)
        }
    }
}
