//! Filter chain construction from a client-supplied bitmask.
//!
//! Each bit of the `filters` query parameter selects a named engine filter
//! stage. The emitted expression always lists stages in a fixed canonical
//! order, so identical masks produce identical engine invocations.

/// Remove low-frequency rumble.
pub const FILTER_HIGHPASS: u32 = 1 << 0;
/// Remove high-frequency noise.
pub const FILTER_LOWPASS: u32 = 1 << 1;
/// FFT-based noise reduction.
pub const FILTER_DENOISER: u32 = 1 << 2;
/// Remove clicks and pops.
pub const FILTER_DECLICK: u32 = 1 << 3;
/// Reduce harsh sibilance.
pub const FILTER_DEESSER: u32 = 1 << 4;
/// Loudness normalization.
pub const FILTER_NORMALIZE: u32 = 1 << 5;
/// Modifier: switch the denoiser to its speech profile. Only meaningful
/// together with [`FILTER_DENOISER`]; it adds no stage of its own.
pub const FILTER_DENOISER_SPEECH: u32 = 1 << 6;

const STAGE_BITS: u32 = FILTER_HIGHPASS
    | FILTER_LOWPASS
    | FILTER_DENOISER
    | FILTER_DECLICK
    | FILTER_DEESSER
    | FILTER_NORMALIZE;

/// The set of filter stages to apply plus the denoiser speech-mode flag.
///
/// Unknown mask bits are dropped at construction; every mask value maps to
/// some valid (possibly empty) chain, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterChain {
    stages: u32,
    speech_mode: bool,
}

impl FilterChain {
    /// Chain with every filter enabled and the denoiser in speech mode.
    pub fn all() -> Self {
        Self {
            stages: STAGE_BITS,
            speech_mode: true,
        }
    }

    /// Normalize a raw bitmask into a chain.
    ///
    /// Unrecognized bits are silently dropped, and the speech flag is only
    /// retained when the denoiser itself is enabled.
    pub fn from_mask(mask: u32) -> Self {
        let stages = mask & STAGE_BITS;
        Self {
            stages,
            speech_mode: mask & FILTER_DENOISER_SPEECH != 0 && stages & FILTER_DENOISER != 0,
        }
    }

    /// Parse the `filters` query parameter.
    ///
    /// Empty input and anything unparseable yield the empty chain; the
    /// literals `"true"` and `"all"` enable everything.
    pub fn parse(param: &str) -> Self {
        match param {
            "" => Self::default(),
            "true" | "all" => Self::all(),
            _ => param
                .parse::<u32>()
                .map(Self::from_mask)
                .unwrap_or_default(),
        }
    }

    /// True when no filter stage is enabled.
    pub fn is_empty(&self) -> bool {
        self.stages == 0
    }

    /// Render the engine filter expression, stages in canonical order
    /// (highpass, lowpass, denoiser, declick, deesser, normalize).
    /// Returns the empty string for the empty chain.
    pub fn expression(&self) -> String {
        let mut stages: Vec<String> = Vec::new();

        if self.stages & FILTER_HIGHPASS != 0 {
            stages.push("highpass=f=75:p=1".into());
        }
        if self.stages & FILTER_LOWPASS != 0 {
            stages.push("lowpass=f=7500:p=1".into());
        }
        if self.stages & FILTER_DENOISER != 0 {
            let profile = if self.speech_mode { "s" } else { "w" };
            stages.push(format!("afftdn=nf=-25:nt={profile}"));
        }
        if self.stages & FILTER_DECLICK != 0 {
            stages.push("adeclick=t=2:w=10".into());
        }
        if self.stages & FILTER_DEESSER != 0 {
            stages.push("deesser".into());
        }
        if self.stages & FILTER_NORMALIZE != 0 {
            stages.push("dynaudnorm".into());
        }

        stages.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mask_compiles_to_empty_expression() {
        assert_eq!(FilterChain::from_mask(0).expression(), "");
        assert!(FilterChain::from_mask(0).is_empty());
    }

    #[test]
    fn canonical_order_is_independent_of_bit_order() {
        // Normalize | Highpass: highpass must still come first.
        let chain = FilterChain::from_mask(FILTER_NORMALIZE | FILTER_HIGHPASS);
        assert_eq!(chain.expression(), "highpass=f=75:p=1,dynaudnorm");
    }

    #[test]
    fn full_chain_in_canonical_order() {
        let chain = FilterChain::from_mask(STAGE_BITS | FILTER_DENOISER_SPEECH);
        assert_eq!(
            chain.expression(),
            "highpass=f=75:p=1,lowpass=f=7500:p=1,afftdn=nf=-25:nt=s,\
             adeclick=t=2:w=10,deesser,dynaudnorm"
        );
    }

    #[test]
    fn denoiser_defaults_to_wide_profile() {
        let chain = FilterChain::from_mask(FILTER_DENOISER);
        assert_eq!(chain.expression(), "afftdn=nf=-25:nt=w");
    }

    #[test]
    fn speech_bit_without_denoiser_adds_nothing() {
        let chain = FilterChain::from_mask(FILTER_DENOISER_SPEECH);
        assert_eq!(chain, FilterChain::default());
        assert_eq!(chain.expression(), "");
    }

    #[test]
    fn unknown_bits_are_dropped() {
        let chain = FilterChain::from_mask((1 << 12) | (1 << 20) | FILTER_HIGHPASS);
        assert_eq!(chain, FilterChain::from_mask(FILTER_HIGHPASS));
        assert_eq!(chain.expression(), "highpass=f=75:p=1");
    }

    #[test]
    fn parse_empty_is_empty() {
        assert_eq!(FilterChain::parse(""), FilterChain::default());
    }

    #[test]
    fn parse_all_and_true_enable_everything() {
        assert_eq!(FilterChain::parse("all"), FilterChain::all());
        assert_eq!(FilterChain::parse("true"), FilterChain::all());
        // Speech mode rides along with the full chain.
        assert!(FilterChain::parse("all")
            .expression()
            .contains("afftdn=nf=-25:nt=s"));
    }

    #[test]
    fn parse_decimal_mask() {
        let chain = FilterChain::parse("5");
        assert_eq!(
            chain,
            FilterChain::from_mask(FILTER_HIGHPASS | FILTER_DENOISER)
        );
        assert_eq!(chain.expression(), "highpass=f=75:p=1,afftdn=nf=-25:nt=w");
    }

    #[test]
    fn parse_malformed_is_empty_not_error() {
        for param in ["junk", "-3", "1.5", "0x10", "   ", "99999999999999999999"] {
            assert_eq!(FilterChain::parse(param), FilterChain::default(), "{param}");
        }
    }
}
