//! Descriptor - the shared input of every analysis stage
//!
//! A [`Descriptor`] owns both channels and the mask, and computes the
//! per-channel statistics over the masked pixels once at construction.
//! After that it is read-only, except for the [`ThresholdPair`] which can
//! be set exactly once by the threshold search.
//!
//! # Examples
//!
//! ```
//! use coloc_core::{Channel, Descriptor, Mask};
//!
//! let ch1 = Channel::from_u8(&[2, 2], &[1, 2, 3, 4]).unwrap();
//! let ch2 = Channel::from_u8(&[2, 2], &[2, 4, 6, 8]).unwrap();
//! let mask = Mask::full(&[2, 2]).unwrap();
//! let d = Descriptor::new(ch1, ch2, mask).unwrap();
//! assert_eq!(d.stats1().mean, 2.5);
//! assert_eq!(d.stats2().integral, 20.0);
//! ```

use tracing::debug;

use crate::channel::{Channel, SampleType};
use crate::error::{Error, Result};
use crate::mask::{BoundingBox, Mask, MaskType};
use crate::pairs::MaskedPairs;

/// Statistics of one channel over the masked pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sum of all masked samples
    pub integral: f64,
}

/// Background/signal cut-off of both channels
///
/// The lower thresholds are the representable minimum of the sample type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPair {
    pub ch1_min: f64,
    pub ch1_max: f64,
    pub ch2_min: f64,
    pub ch2_max: f64,
}

impl ThresholdPair {
    /// Threshold pair with the lower bounds at the type minimum
    pub fn new(ch1_max: f64, ch2_max: f64, sample_type: SampleType) -> Self {
        Self {
            ch1_min: sample_type.min_value(),
            ch1_max,
            ch2_min: sample_type.min_value(),
            ch2_max,
        }
    }
}

/// Two channels, a mask, and their baseline statistics
#[derive(Debug, Clone)]
pub struct Descriptor {
    ch1: Channel,
    ch2: Channel,
    mask: Mask,
    name1: String,
    name2: String,
    stats1: ChannelStats,
    stats2: ChannelStats,
    count: usize,
    threshold: Option<ThresholdPair>,
}

impl Descriptor {
    /// Build a descriptor and compute the channel statistics
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` if the channels or mask differ in
    /// shape, `Error::SampleTypeMismatch` if the channels differ in type,
    /// and `Error::EmptyMask` if no pixel is selected.
    pub fn new(ch1: Channel, ch2: Channel, mask: Mask) -> Result<Self> {
        if ch1.sample_type() != ch2.sample_type() {
            return Err(Error::SampleTypeMismatch(
                ch1.sample_type(),
                ch2.sample_type(),
            ));
        }

        let (stats1, stats2, count) = {
            let pairs = MaskedPairs::new(&ch1, &ch2, &mask)?;
            compute_stats(pairs)?
        };
        debug!(
            pixels = count,
            mean1 = stats1.mean,
            mean2 = stats2.mean,
            "descriptor statistics"
        );

        Ok(Self {
            ch1,
            ch2,
            mask,
            name1: "Channel 1".to_string(),
            name2: "Channel 2".to_string(),
            stats1,
            stats2,
            count,
            threshold: None,
        })
    }

    /// Set the display names of both channels
    pub fn with_names(mut self, name1: impl Into<String>, name2: impl Into<String>) -> Self {
        self.name1 = name1.into();
        self.name2 = name2.into();
        self
    }

    #[inline]
    pub fn channel1(&self) -> &Channel {
        &self.ch1
    }

    #[inline]
    pub fn channel2(&self) -> &Channel {
        &self.ch2
    }

    #[inline]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox {
        self.mask.bounding_box()
    }

    pub fn mask_type(&self) -> MaskType {
        self.mask.mask_type()
    }

    /// Image extents
    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.ch1.dims()
    }

    #[inline]
    pub fn sample_type(&self) -> SampleType {
        self.ch1.sample_type()
    }

    pub fn name1(&self) -> &str {
        &self.name1
    }

    pub fn name2(&self) -> &str {
        &self.name2
    }

    /// Name of the analysis job, derived from the channel names
    pub fn job_name(&self) -> String {
        format!("Colocalization_of_{}_versus_{}", self.name1, self.name2)
    }

    #[inline]
    pub fn stats1(&self) -> &ChannelStats {
        &self.stats1
    }

    #[inline]
    pub fn stats2(&self) -> &ChannelStats {
        &self.stats2
    }

    /// Number of masked pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.count
    }

    /// A fresh walk over the masked sample pairs
    pub fn pairs(&self) -> MaskedPairs<'_> {
        // Shapes were validated in `new`.
        MaskedPairs::unchecked(self.ch1.dims(), self.ch1.data(), self.ch2.data(), &self.mask)
    }

    pub fn threshold(&self) -> Option<&ThresholdPair> {
        self.threshold.as_ref()
    }

    /// Store the threshold pair
    ///
    /// # Errors
    ///
    /// Returns `Error::ThresholdAlreadySet` on a second call.
    pub fn set_threshold(&mut self, threshold: ThresholdPair) -> Result<()> {
        if self.threshold.is_some() {
            return Err(Error::ThresholdAlreadySet);
        }
        self.threshold = Some(threshold);
        Ok(())
    }

    /// The same data with the channels swapped
    ///
    /// The threshold pair is swapped along with them.
    pub fn swapped(&self) -> Self {
        Self {
            ch1: self.ch2.clone(),
            ch2: self.ch1.clone(),
            mask: self.mask.clone(),
            name1: self.name2.clone(),
            name2: self.name1.clone(),
            stats1: self.stats2,
            stats2: self.stats1,
            count: self.count,
            threshold: self.threshold.map(|t| ThresholdPair {
                ch1_min: t.ch2_min,
                ch1_max: t.ch2_max,
                ch2_min: t.ch1_min,
                ch2_max: t.ch1_max,
            }),
        }
    }
}

fn compute_stats(pairs: MaskedPairs<'_>) -> Result<(ChannelStats, ChannelStats, usize)> {
    let mut s1 = ChannelStats {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
        mean: 0.0,
        integral: 0.0,
    };
    let mut s2 = s1;
    let mut count = 0usize;
    for (a, b) in pairs {
        count += 1;
        s1.min = s1.min.min(a);
        s1.max = s1.max.max(a);
        s1.integral += a;
        s2.min = s2.min.min(b);
        s2.max = s2.max.max(b);
        s2.integral += b;
    }
    if count == 0 {
        return Err(Error::EmptyMask);
    }
    s1.mean = s1.integral / count as f64;
    s2.mean = s2.integral / count as f64;
    Ok((s1, s2, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Descriptor {
        let ch1 = Channel::from_u8(&[3, 2], &[0, 2, 4, 6, 8, 10]).unwrap();
        let ch2 = Channel::from_u8(&[3, 2], &[5, 5, 5, 1, 1, 1]).unwrap();
        let mask = Mask::rect(&[3, 2], &[1], &[2]).unwrap();
        Descriptor::new(ch1, ch2, mask).unwrap()
    }

    #[test]
    fn test_masked_stats() {
        let d = sample();
        assert_eq!(d.pixel_count(), 4);
        assert_eq!(d.stats1().min, 2.0);
        assert_eq!(d.stats1().max, 10.0);
        assert_eq!(d.stats1().integral, 2.0 + 4.0 + 8.0 + 10.0);
        assert_eq!(d.stats1().mean, 6.0);
        assert_eq!(d.stats2().mean, 3.0);
        assert_eq!(d.mask_type(), MaskType::Regular);
    }

    #[test]
    fn test_threshold_set_once() {
        let mut d = sample();
        assert!(d.threshold().is_none());
        let t = ThresholdPair::new(4.0, 2.0, SampleType::U8);
        d.set_threshold(t).unwrap();
        assert_eq!(d.threshold().map(|t| t.ch1_min), Some(0.0));
        assert!(matches!(
            d.set_threshold(t),
            Err(Error::ThresholdAlreadySet)
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let ch1 = Channel::from_u8(&[2], &[1, 2]).unwrap();
        let ch2 = Channel::from_u16(&[2], &[1, 2]).unwrap();
        let mask = Mask::full(&[2]).unwrap();
        assert!(matches!(
            Descriptor::new(ch1, ch2, mask),
            Err(Error::SampleTypeMismatch(SampleType::U8, SampleType::U16))
        ));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Descriptor>();
    }

    #[test]
    fn test_job_name_and_swap() {
        let d = sample().with_names("red", "green");
        assert_eq!(d.job_name(), "Colocalization_of_red_versus_green");
        let s = d.swapped();
        assert_eq!(s.name1(), "green");
        assert_eq!(s.stats1().mean, 3.0);
        let first: Vec<_> = s.pairs().take(1).collect();
        assert_eq!(first, vec![(5.0, 2.0)]);
    }
}
