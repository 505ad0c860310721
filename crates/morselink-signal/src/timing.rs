use morselink_core::TimingScheme;

/// Flash ratio table. Every timeline duration is `units × unit_ms`.
///
/// Two historical tables exist; a timeline is built from exactly one and
/// never mixes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashTiming {
    pub unit_ms: u64,
    pub dot_units: u64,
    pub dash_units: u64,
    /// Off gap after each dot or dash.
    pub symbol_gap_units: u64,
    pub letter_gap_units: u64,
    pub word_gap_units: u64,
    /// Off priming delay before the first flash.
    pub lead_in_units: u64,
}

impl FlashTiming {
    /// Default unit length in milliseconds.
    pub const DEFAULT_UNIT_MS: u64 = 200;

    /// The 1/5/5 table: five-unit dash and five-unit letter/word gaps.
    pub const fn classic(unit_ms: u64) -> Self {
        Self {
            unit_ms,
            dot_units: 1,
            dash_units: 5,
            symbol_gap_units: 1,
            letter_gap_units: 5,
            word_gap_units: 5,
            lead_in_units: 5,
        }
    }

    /// The 1/3/2/6 table: three-unit dash, two-unit letter gap, six-unit
    /// word gap.
    pub const fn compact(unit_ms: u64) -> Self {
        Self {
            unit_ms,
            dot_units: 1,
            dash_units: 3,
            symbol_gap_units: 1,
            letter_gap_units: 2,
            word_gap_units: 6,
            lead_in_units: 5,
        }
    }

    pub fn for_scheme(scheme: TimingScheme, unit_ms: u64) -> Self {
        match scheme {
            TimingScheme::Classic => Self::classic(unit_ms),
            TimingScheme::Compact => Self::compact(unit_ms),
        }
    }

    pub(crate) fn ms(&self, units: u64) -> u64 {
        units * self.unit_ms
    }
}

impl Default for FlashTiming {
    fn default() -> Self {
        Self::classic(Self::DEFAULT_UNIT_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::FlashTiming;
    use morselink_core::TimingScheme;

    #[test]
    fn default_is_classic_at_200ms() {
        assert_eq!(FlashTiming::default(), FlashTiming::classic(200));
    }

    #[test]
    fn scheme_selection() {
        assert_eq!(FlashTiming::for_scheme(TimingScheme::Classic, 100).dash_units, 5);
        assert_eq!(FlashTiming::for_scheme(TimingScheme::Compact, 100).dash_units, 3);
        assert_eq!(FlashTiming::for_scheme(TimingScheme::Compact, 100).word_gap_units, 6);
    }
}
