// Matches per-room prices with per-room deposits.
//
// Deposits carry a "(Room N)" label pointing at the N-th room of the price
// list. When a room has been let its deposit disappears from the page, so the
// label is the only reliable link between the two lists.
use crate::model::{FieldError, RoomPrice};
use crate::normalizer::keyed::value_after;
use regex::Regex;
use std::sync::LazyLock;

const ROOM_MARKER: &str = "(Room ";
const NOW_LET: &str = "(NOW LET)";
const DEPOSIT_KEY: &str = "Deposit";
const BILLS_KEY: &str = "Bills included?";

static RE_ROOM_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("invalid regex: room index"));

/// Builds the room list from `[price, type, price, type, ...]` and fills in
/// deposits and bills from the extra-cost tokens.
pub fn reconcile(room_price: &[String], room_deposit: &[String]) -> Result<Vec<RoomPrice>, FieldError> {
    if room_price.is_empty() {
        return Ok(Vec::new());
    }

    let mut rooms = build_rooms(room_price)?;
    let bills = value_after(room_deposit, BILLS_KEY).map(str::to_string);

    let markers: Vec<(usize, &String)> = room_deposit
        .iter()
        .enumerate()
        .filter(|(_, token)| token.contains(ROOM_MARKER))
        .collect();

    if markers.is_empty() {
        // Single deposit for the whole listing; let rooms have none.
        let deposit = value_after(room_deposit, DEPOSIT_KEY);
        for room in rooms.iter_mut() {
            if room.room_type != NOW_LET {
                room.deposit = deposit.map(str::to_string);
            }
            room.bills_included = bills.clone();
        }
        return Ok(rooms);
    }

    let count = rooms.len();
    for (position, marker) in markers {
        let index = room_index(marker)?;
        let room = index
            .checked_sub(1)
            .and_then(|i| rooms.get_mut(i))
            .ok_or_else(|| {
                FieldError::new(
                    "room_deposit",
                    format!("{marker:?} points at room {index}, listing has {count} room(s)"),
                )
            })?;
        let deposit = room_deposit.get(position + 1).ok_or_else(|| {
            FieldError::new("room_deposit", format!("{marker:?} has no deposit after it"))
        })?;

        // Labelled deposits always come with a bills line.
        let bills = bills.clone().ok_or_else(|| {
            FieldError::new("room_deposit", format!("no value for {BILLS_KEY:?}"))
        })?;

        room.deposit = Some(deposit.clone());
        room.bills_included = Some(bills);
    }

    Ok(rooms)
}

fn build_rooms(room_price: &[String]) -> Result<Vec<RoomPrice>, FieldError> {
    room_price
        .chunks(2)
        .map(|pair| match pair {
            [price, room_type] => Ok(RoomPrice::new(price.as_str(), room_type.as_str())),
            _ => Err(FieldError::new(
                "room_price",
                format!("{} tokens do not pair up into price/type", room_price.len()),
            )),
        })
        .collect()
}

fn room_index(marker: &str) -> Result<usize, FieldError> {
    RE_ROOM_INDEX
        .find(marker)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| FieldError::new("room_deposit", format!("{marker:?} has no room number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_rooms_no_reconciliation() {
        let rooms = reconcile(&[], &tokens(&["(Room 1)", "£400"])).unwrap();
        assert!(rooms.is_empty());
    }

    #[test]
    fn indexed_deposits_follow_room_markers() {
        let price = tokens(&["£500", "Double", "£450", "Single"]);
        let deposit = tokens(&["(Room 1)", "£400", "Bills included?", "Yes", "(Room 2)", "£350"]);

        let rooms = reconcile(&price, &deposit).unwrap();

        assert_eq!(
            rooms,
            vec![
                RoomPrice {
                    price: "£500".into(),
                    room_type: "Double".into(),
                    deposit: Some("£400".into()),
                    bills_included: Some("Yes".into()),
                },
                RoomPrice {
                    price: "£450".into(),
                    room_type: "Single".into(),
                    deposit: Some("£350".into()),
                    bills_included: Some("Yes".into()),
                },
            ]
        );
    }

    #[test]
    fn let_room_without_marker_keeps_null_deposit() {
        let price = tokens(&["£500", "Double", "£450", "(NOW LET)", "£420", "Single"]);
        let deposit = tokens(&["Deposit", "£999", "(Room 1)", "£400", "(Room 3)", "£380", "Bills included?", "No"]);

        let rooms = reconcile(&price, &deposit).unwrap();

        assert_eq!(rooms[0].deposit.as_deref(), Some("£400"));
        assert_eq!(rooms[1].deposit, None);
        assert_eq!(rooms[1].bills_included, None);
        assert_eq!(rooms[2].deposit.as_deref(), Some("£380"));
        assert_eq!(rooms[2].bills_included.as_deref(), Some("No"));
    }

    #[test]
    fn flat_deposit_applies_to_every_room() {
        let price = tokens(&["£500", "Single"]);
        let deposit = tokens(&["Deposit", "£400", "Bills included?", "No"]);

        let rooms = reconcile(&price, &deposit).unwrap();

        assert_eq!(
            rooms,
            vec![RoomPrice {
                price: "£500".into(),
                room_type: "Single".into(),
                deposit: Some("£400".into()),
                bills_included: Some("No".into()),
            }]
        );
    }

    #[test]
    fn flat_deposit_skips_let_rooms() {
        let price = tokens(&["£500", "Double", "£450", "(NOW LET)"]);
        let deposit = tokens(&["Deposit", "£400", "Bills included?", "Yes"]);

        let rooms = reconcile(&price, &deposit).unwrap();

        assert_eq!(rooms[0].deposit.as_deref(), Some("£400"));
        assert_eq!(rooms[1].deposit, None);
        assert_eq!(rooms[1].bills_included.as_deref(), Some("Yes"));
    }

    #[test]
    fn flat_branch_missing_keys_are_null() {
        let rooms = reconcile(&tokens(&["£500", "Single"]), &[]).unwrap();
        assert_eq!(rooms[0].deposit, None);
        assert_eq!(rooms[0].bills_included, None);
    }

    #[test]
    fn out_of_range_marker_is_an_error() {
        let price = tokens(&["£500", "Double"]);
        for marker in ["(Room 2)", "(Room 0)"] {
            let deposit = tokens(&[marker, "£400"]);
            let err = reconcile(&price, &deposit).unwrap_err();
            assert_eq!(err.field, "room_deposit");
        }
    }

    #[test]
    fn marker_without_deposit_is_an_error() {
        let err = reconcile(&tokens(&["£500", "Double"]), &tokens(&["(Room 1)"])).unwrap_err();
        assert!(err.reason.contains("no deposit"));
    }

    #[test]
    fn labelled_deposit_without_bills_is_an_error() {
        let err = reconcile(&tokens(&["£500", "Double"]), &tokens(&["(Room 1)", "£400"])).unwrap_err();
        assert_eq!(err.field, "room_deposit");
        assert!(err.reason.contains("Bills included?"));
    }

    #[test]
    fn unpaired_price_is_an_error() {
        let err = reconcile(&tokens(&["£500", "Double", "£450"]), &[]).unwrap_err();
        assert_eq!(err.field, "room_price");
    }
}
