//! Sequential order numbers: 5-digit zero-padded strings.

/// Next order number: one past the highest numeric value among the
/// existing numbers, re-padded to 5 digits. `"00001"` when no orders
/// exist. Gaps are never back-filled and deleted numbers are never
/// reserved, so deleting the highest-numbered order lets its number be
/// reissued.
pub fn next_order_number<'a, I>(existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = existing
        .into_iter()
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{:05}", max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_number_is_00001() {
        assert_eq!(next_order_number(std::iter::empty::<&str>()), "00001");
    }

    #[test]
    fn increments_past_the_maximum_not_the_first_gap() {
        assert_eq!(next_order_number(["00001", "00003"]), "00004");
    }

    #[test]
    fn pads_to_five_digits() {
        assert_eq!(next_order_number(["00009"]), "00010");
        assert_eq!(next_order_number(["00099", "00100"]), "00101");
    }

    #[test]
    fn ignores_unparseable_numbers() {
        assert_eq!(next_order_number(["garbage", "00002"]), "00003");
        assert_eq!(next_order_number(["garbage"]), "00001");
    }

    #[test]
    fn deleted_maximum_allows_reuse() {
        // "00003" was deleted; the next creation reissues it.
        assert_eq!(next_order_number(["00001", "00002"]), "00003");
    }
}
