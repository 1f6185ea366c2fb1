//! Leveled residue polynomials as the codec sees them.
//!
//! A [`Poly`] at level `l` holds `l + 1` limbs of `degree` residues each,
//! limb `j` reduced modulo the `j`-th prime of its chain. The NTT and
//! Montgomery flags are carried verbatim and never interpreted here.

use crate::errors::{CodecError, CodecResult};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poly {
    /// limbs[j][i] = i-th coefficient residue modulo the j-th prime
    limbs: Vec<Vec<u64>>,
    pub is_ntt: bool,
    pub is_mform: bool,
}

impl Poly {
    /// Zero polynomial with `level + 1` limbs. Fails on a zero degree.
    pub fn zero(degree: usize, level: usize) -> CodecResult<Self> {
        Self::from_limbs(vec![vec![0; degree]; level + 1])
    }

    pub fn from_limbs(limbs: Vec<Vec<u64>>) -> CodecResult<Self> {
        let Some(first) = limbs.first() else {
            return Err(CodecError::EmptyObject);
        };
        let degree = first.len();
        if degree == 0 {
            return Err(CodecError::RaggedLimbs {
                limb: 0,
                expected: 1,
                actual: 0,
            });
        }
        if let Some((limb, l)) = limbs.iter().enumerate().find(|(_, l)| l.len() != degree) {
            return Err(CodecError::RaggedLimbs {
                limb,
                expected: degree,
                actual: l.len(),
            });
        }
        Ok(Self {
            limbs,
            is_ntt: false,
            is_mform: false,
        })
    }

    pub fn with_flags(mut self, is_ntt: bool, is_mform: bool) -> Self {
        self.is_ntt = is_ntt;
        self.is_mform = is_mform;
        self
    }

    pub fn degree(&self) -> usize {
        self.limbs[0].len()
    }

    pub fn level(&self) -> usize {
        self.limbs.len() - 1
    }

    pub fn limbs(&self) -> &[Vec<u64>] {
        &self.limbs
    }

    pub fn limb(&self, j: usize) -> &[u64] {
        &self.limbs[j]
    }

    pub fn limb_mut(&mut self, j: usize) -> &mut [u64] {
        &mut self.limbs[j]
    }

    /// Drops the top `count` limbs (RNS mod-drop); the remaining limbs are
    /// untouched.
    pub fn drop_level(&mut self, count: usize) -> CodecResult<()> {
        if count > self.level() {
            return Err(CodecError::LevelOutOfChain {
                level: count,
                chain_len: self.limbs.len(),
            });
        }
        self.limbs.truncate(self.limbs.len() - count);
        Ok(())
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let degree = self.degree();
        let shown = 3;

        let term = |f: &mut fmt::Formatter<'_>, i: usize| -> fmt::Result {
            write!(f, "[")?;
            for (c, limb) in self.limbs.iter().enumerate() {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", limb[i])?;
            }
            write!(f, "]*x^{i}")
        };

        write!(f, "Poly<N={degree}, L={}", self.level())?;
        if self.is_ntt {
            write!(f, ", ntt")?;
        }
        if self.is_mform {
            write!(f, ", mform")?;
        }
        write!(f, ">[")?;
        if degree <= shown * 2 {
            for i in 0..degree {
                if i > 0 {
                    write!(f, ", ")?;
                }
                term(f, i)?;
            }
        } else {
            for i in 0..shown {
                if i > 0 {
                    write!(f, ", ")?;
                }
                term(f, i)?;
            }
            write!(f, ", …")?;
            for i in (degree - shown)..degree {
                write!(f, ", ")?;
                term(f, i)?;
            }
        }
        write!(f, "]")
    }
}

/// A polynomial split across the Q chain and the auxiliary P chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyQP {
    pub q: Poly,
    pub p: Poly,
}

impl PolyQP {
    pub fn new(q: Poly, p: Poly) -> CodecResult<Self> {
        if q.degree() != p.degree() {
            return Err(CodecError::RingDegreeMismatch {
                expected: q.degree(),
                actual: p.degree(),
            });
        }
        Ok(Self { q, p })
    }

    pub fn degree(&self) -> usize {
        self.q.degree()
    }

    pub fn level_q(&self) -> usize {
        self.q.level()
    }

    pub fn level_p(&self) -> usize {
        self.p.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_and_degree_follow_limb_shape() {
        let poly = Poly::zero(8, 2).unwrap();
        assert_eq!(poly.degree(), 8);
        assert_eq!(poly.level(), 2);
        assert_eq!(poly.limbs().len(), 3);
    }

    #[test]
    fn from_limbs_rejects_ragged_and_empty_input() {
        assert_eq!(Poly::from_limbs(vec![]), Err(CodecError::EmptyObject));
        assert_eq!(
            Poly::from_limbs(vec![vec![1, 2, 3, 4], vec![1, 2]]),
            Err(CodecError::RaggedLimbs {
                limb: 1,
                expected: 4,
                actual: 2
            })
        );
        assert!(Poly::from_limbs(vec![vec![]]).is_err());
    }

    #[test]
    fn zero_rejects_empty_degree_like_from_limbs() {
        assert_eq!(Poly::zero(0, 1), Poly::from_limbs(vec![vec![], vec![]]));
        assert!(Poly::zero(0, 0).is_err());
        assert_eq!(Poly::zero(2, 1).unwrap().level(), 1);
    }

    #[test]
    fn drop_level_truncates_top_limbs() {
        let mut poly =
            Poly::from_limbs(vec![vec![1, 2], vec![3, 4], vec![5, 6]]).unwrap();
        poly.drop_level(2).unwrap();
        assert_eq!(poly.level(), 0);
        assert_eq!(poly.limb(0), &[1, 2]);
        assert!(poly.drop_level(1).is_err());
    }

    #[test]
    fn display_elides_long_polynomials() {
        let poly = Poly::zero(16, 0).unwrap().with_flags(true, false);
        let shown = poly.to_string();
        assert!(shown.starts_with("Poly<N=16, L=0, ntt>["));
        assert!(shown.contains("…"));
        assert!(shown.ends_with("[0]*x^15]"));
    }

    #[test]
    fn qp_halves_must_share_a_degree() {
        let q = Poly::zero(8, 1).unwrap();
        assert!(PolyQP::new(q.clone(), Poly::zero(8, 0).unwrap()).is_ok());
        assert_eq!(
            PolyQP::new(q, Poly::zero(4, 0).unwrap()),
            Err(CodecError::RingDegreeMismatch {
                expected: 8,
                actual: 4
            })
        );
    }
}
