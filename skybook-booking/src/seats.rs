use skybook_core::PassengerRequest;
use std::collections::HashSet;

const SEAT_LETTERS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

/// Label for the `index`-th seat in row-major order: 1A..1F, 2A..
fn label_for(index: usize) -> String {
    let row = index / SEAT_LETTERS.len() + 1;
    let letter = SEAT_LETTERS[index % SEAT_LETTERS.len()];
    format!("{row}{letter}")
}

/// One seat label per passenger, in passenger order.
///
/// A label the passenger asked for is kept as is; everyone else gets the next
/// row-major label not already requested by someone in the same booking.
pub fn assign_seat_labels(passengers: &[PassengerRequest]) -> Vec<String> {
    let requested: HashSet<&str> = passengers
        .iter()
        .filter_map(|p| p.seat_number.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut free = (0..).map(label_for).filter(|label| !requested.contains(label.as_str()));

    passengers
        .iter()
        .map(|p| match p.seat_number.as_deref().map(str::trim) {
            Some(seat) if !seat.is_empty() => seat.to_string(),
            _ => free.next().unwrap_or_default(),
        })
        .collect()
}

pub fn join_seat_labels(labels: &[String]) -> String {
    labels.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passenger(seat: Option<&str>) -> PassengerRequest {
        PassengerRequest {
            name: "Pax".to_string(),
            gender: "Female".to_string(),
            age: 40,
            seat_number: seat.map(str::to_string),
            meal_preference: None,
        }
    }

    #[test]
    fn test_sequential_labels() {
        let passengers: Vec<_> = (0..8).map(|_| passenger(None)).collect();
        let labels = assign_seat_labels(&passengers);
        assert_eq!(labels, vec!["1A", "1B", "1C", "1D", "1E", "1F", "2A", "2B"]);
        assert_eq!(join_seat_labels(&labels[..2]), "1A,1B");
    }

    #[test]
    fn test_requested_seats_are_kept_and_skipped() {
        let passengers = vec![passenger(None), passenger(Some("1A")), passenger(Some(" ")), passenger(None)];
        let labels = assign_seat_labels(&passengers);
        assert_eq!(labels, vec!["1B", "1A", "1C", "1D"]);
    }

    #[test]
    fn test_labels_are_stable() {
        let passengers = vec![passenger(Some("12C")), passenger(None)];
        assert_eq!(assign_seat_labels(&passengers), assign_seat_labels(&passengers));
    }
}
