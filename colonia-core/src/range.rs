use crate::ids::CommunityId;
use crate::is_present;
use crate::model::NewResidence;

/// Ranges spanning more than this many numbers are created, but reported back with a warning
pub const LARGE_RANGE_THRESHOLD: u32 = 100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("street is required")]
    BlankStreet,
    #[error("start number {start} is greater than end number {end}")]
    StartAfterEnd { start: u32, end: u32 },
}

/// An inclusive run of house numbers on a single street
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidenceRange {
    street: String,
    start: u32,
    end: u32,
    reference: Option<String>,
}

impl ResidenceRange {
    pub fn new(
        street: String,
        start: u32,
        end: u32,
        reference: Option<String>,
    ) -> Result<Self, RangeError> {
        if !is_present(&street) {
            return Err(RangeError::BlankStreet);
        }
        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }

        Ok(Self {
            street: street.trim().to_string(),
            start,
            end,
            reference,
        })
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn is_large(&self) -> bool {
        self.end - self.start > LARGE_RANGE_THRESHOLD
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn residences(&self, community_id: CommunityId) -> Vec<NewResidence> {
        (self.start..=self.end)
            .map(|number| {
                NewResidence::new(
                    number.to_string(),
                    self.street.clone(),
                    self.reference.clone(),
                    community_id,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusive_range_yields_sequential_numbers_on_one_street() {
        let community_id = CommunityId::new();
        let range = ResidenceRange::new("Calle Roble".to_string(), 10, 14, None).unwrap();

        let residences = range.residences(community_id);

        assert_eq!(5, range.len());
        assert_eq!(5, residences.len());
        let numbers: Vec<_> = residences.iter().map(|r| r.number.as_str()).collect();
        assert_eq!(vec!["10", "11", "12", "13", "14"], numbers);
        assert!(residences.iter().all(|r| r.street == "Calle Roble"));
        assert!(residences.iter().all(|r| r.community_id == community_id));
    }

    #[test]
    fn single_number_range() {
        let range = ResidenceRange::new("Pino".to_string(), 7, 7, None).unwrap();

        assert_eq!(1, range.residences(CommunityId::new()).len());
        assert!(!range.is_large());
    }

    #[test]
    fn start_after_end_is_rejected() {
        assert_eq!(
            Err(RangeError::StartAfterEnd { start: 9, end: 3 }),
            ResidenceRange::new("Pino".to_string(), 9, 3, None)
        );
    }

    #[test]
    fn blank_street_is_rejected() {
        assert_eq!(
            Err(RangeError::BlankStreet),
            ResidenceRange::new("  ".to_string(), 1, 3, None)
        );
    }

    #[test]
    fn wide_range_is_flagged_but_allowed() {
        let at_threshold = ResidenceRange::new("Cedro".to_string(), 1, 101, None).unwrap();
        let past_threshold = ResidenceRange::new("Cedro".to_string(), 1, 102, None).unwrap();

        assert!(!at_threshold.is_large());
        assert!(past_threshold.is_large());
        assert_eq!(102, past_threshold.len());
    }

    #[test]
    fn ranges_have_no_upper_bound() {
        let range = ResidenceRange::new("Cedro".to_string(), 0, u32::MAX, None).unwrap();

        assert!(range.is_large());
        assert_eq!(u32::MAX as usize + 1, range.len());
    }
}
