//! Console rendering of experiment results.
//!
//! Every float that matters for reproducibility is shown with its raw bit
//! pattern next to the decimal value, since two estimates can print the same
//! and still differ.

use std::fmt;

use crate::experiment::{ReproducibilityCheck, SequentialPass};
use crate::sampler::Sample;
use crate::stats::ConfidenceReport;

/// One replicate estimate: `estimation: 4.18878120 (0x4010c1...) in (1.23 sec)`.
#[derive(Clone, Copy, Debug)]
pub struct EstimationLine<'a>(pub &'a Sample);

impl fmt::Display for EstimationLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "estimation: {:.8} (0x{:016x}) in ({:4.2} sec)",
            self.0.estimate,
            self.0.estimate.to_bits(),
            self.0.elapsed.as_secs_f64()
        )
    }
}

/// Reproducibility verdict for one replicate.
#[derive(Clone, Copy, Debug)]
pub struct VerdictLine<'a>(pub &'a ReproducibilityCheck);

impl fmt::Display for VerdictLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let check = self.0;
        if check.is_match() {
            write!(f, "reproducibility confirmed")
        } else {
            write!(
                f,
                "reproducibility issue {:.8} (0x{:016x}) vs {:.8} (0x{:016x})",
                check.sequential,
                check.sequential.to_bits(),
                check.concurrent,
                check.concurrent.to_bits()
            )
        }
    }
}

/// Total time of the sequential pass.
#[derive(Clone, Copy, Debug)]
pub struct SequentialTimeLine<'a>(pub &'a SequentialPass);

impl fmt::Display for SequentialTimeLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sequential time: {:4.2} sec", self.0.total_elapsed.as_secs_f64())
    }
}

impl fmt::Display for ConfidenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results for {} replicates:", self.replicates)?;
        writeln!(f, "\t- Mean :                         \t{:.10}", self.mean)?;
        writeln!(f, "\t- Variance :                     \t{:.10}", self.variance)?;
        writeln!(f, "\t- Unbiased variance :            \t{:.10}", self.unbiased_variance)?;
        writeln!(f, "\t- Standard deviation :           \t{:.10}", self.standard_deviation)?;
        writeln!(f, "\t- Absolute error : 4π/3 - mean : \t{:.10}", self.absolute_error)?;
        writeln!(
            f,
            "\t- Relative error : Err / 4π/3 :  \t{:.10} %",
            self.relative_error_percent
        )?;
        writeln!(f, "\t- Standard error :               \t{:.10}", self.standard_error)?;
        writeln!(
            f,
            "\t- Confidence interval :          \t[ {:.10} ; {:.10} ]",
            self.lower(),
            self.upper()
        )?;
        match self.location_percent {
            Some(location) => {
                writeln!(f, "\t- 4π/3 location in interval :    \t{location:.10} %")?
            }
            None => writeln!(f, "\t- 4π/3 location in interval :    \tundefined (zero radius)")?,
        }
        write!(f, "\t- Confidence radius :            \t{:.10}", self.radius)
    }
}
