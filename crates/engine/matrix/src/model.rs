//! Dense model file I/O
//!
//! The model format is the judge's: one resolution byte followed by
//! ceil(R^3 / 8) occupancy bytes, cell index x*R^2 + y*R + z, least
//! significant bit first within each byte. The diagnostic dump appends the
//! bot positions after the occupancy payload.

use std::fs;
use std::path::Path;

use glam::IVec3;
use thiserror::Error;

use crate::Matrix;

/// Errors emitted while reading or writing model files.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model payload truncated: expected {expected_bytes} bytes, got {available_bytes}")]
    Truncated {
        expected_bytes: usize,
        available_bytes: usize,
    },

    #[error("unsupported resolution {0}")]
    BadResolution(u8),
}

impl Matrix {
    /// Decodes a model from its dense byte form.
    pub fn from_model_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        let (&resolution, payload) = bytes
            .split_first()
            .ok_or(ModelError::Truncated {
                expected_bytes: 1,
                available_bytes: 0,
            })?;
        if resolution == 0 {
            return Err(ModelError::BadResolution(resolution));
        }
        let r = resolution as usize;
        let expected = (r * r * r).div_ceil(8);
        if payload.len() < expected {
            return Err(ModelError::Truncated {
                expected_bytes: expected + 1,
                available_bytes: bytes.len(),
            });
        }
        let mut m = Matrix::new(r);
        for x in 0..r {
            for y in 0..r {
                for z in 0..r {
                    let i = (x * r + y) * r + z;
                    if payload[i / 8] >> (i % 8) & 1 != 0 {
                        m.set(IVec3::new(x as i32, y as i32, z as i32), true);
                    }
                }
            }
        }
        Ok(m)
    }

    /// Encodes the grid into its dense byte form.
    pub fn to_model_bytes(&self) -> Vec<u8> {
        let r = self.resolution();
        let mut bytes = vec![0u8; 1 + (r * r * r).div_ceil(8)];
        bytes[0] = r as u8;
        for x in 0..r {
            for y in 0..r {
                for z in 0..r {
                    let i = (x * r + y) * r + z;
                    if self.get(IVec3::new(x as i32, y as i32, z as i32)) {
                        bytes[1 + i / 8] |= 1 << (i % 8);
                    }
                }
            }
        }
        bytes
    }

    /// Loads a model file.
    pub fn load_model(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        Self::from_model_bytes(&fs::read(path)?)
    }

    /// Saves the grid as a model file.
    pub fn save_model(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        fs::write(path, self.to_model_bytes())?;
        Ok(())
    }

    /// Saves the grid plus the given bot positions, one byte per coordinate,
    /// for offline inspection of a stuck build.
    pub fn dump_diagnostic(
        &self,
        path: impl AsRef<Path>,
        bots: &[IVec3],
    ) -> Result<(), ModelError> {
        let mut bytes = self.to_model_bytes();
        bytes.push(bots.len() as u8);
        for bot in bots {
            assert!(
                self.contains(*bot),
                "bot at {bot} outside resolution {}",
                self.resolution()
            );
            bytes.extend([bot.x as u8, bot.y as u8, bot.z as u8]);
        }
        fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_layout() {
        let mut m = Matrix::new(2);
        // linear index 0 -> (0,0,0), index 7 -> (1,1,1)
        m.set(IVec3::new(0, 0, 0), true);
        m.set(IVec3::new(1, 1, 1), true);
        let bytes = m.to_model_bytes();
        assert_eq!(bytes, vec![2, 0b1000_0001]);
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let err = Matrix::from_model_bytes(&[3, 0xFF]).unwrap_err();
        match err {
            ModelError::Truncated {
                expected_bytes,
                available_bytes,
            } => {
                assert_eq!(expected_bytes, 1 + 4);
                assert_eq!(available_bytes, 2);
            }
            other => panic!("expected Truncated, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_resolution_rejected() {
        assert!(matches!(
            Matrix::from_model_bytes(&[0]),
            Err(ModelError::BadResolution(0))
        ));
    }
}
