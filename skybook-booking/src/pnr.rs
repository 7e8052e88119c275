use rand::Rng;

pub const PNR_LENGTH: usize = 6;
pub const MAX_PNR_ATTEMPTS: u32 = 5;
const PNR_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random booking locator. Uniqueness is enforced by the ticket store, the
/// orchestrator draws a new one on collision.
pub fn generate_pnr() -> String {
    let mut rng = rand::thread_rng();
    (0..PNR_LENGTH)
        .map(|_| PNR_ALPHABET[rng.gen_range(0..PNR_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_pnr_shape() {
        let pnr = generate_pnr();
        assert_eq!(pnr.len(), PNR_LENGTH);
        assert!(pnr.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_pnrs_vary() {
        let pnrs: HashSet<String> = (0..200).map(|_| generate_pnr()).collect();
        assert!(pnrs.len() > 190);
    }
}
