//! Wire encoding of persisted trace records
//!
//! One record per command, matching the judge's byte layout: an opcode
//! discriminator plus packed delta operands. Near deltas pack into five bits
//! as (dx+1)*9 + (dy+1)*3 + (dz+1); linear move operands carry an axis tag
//! and a biased length.

use glam::IVec3;
use matrix::IVec3Ext;

use crate::Command;

const OP_HALT: u8 = 0b1111_1111;
const OP_WAIT: u8 = 0b1111_1110;
const OP_FLIP: u8 = 0b1111_1101;
const OP_SMOVE: u8 = 0b0100;
const OP_LMOVE: u8 = 0b1100;
const OP_FUSION_P: u8 = 0b111;
const OP_FUSION_S: u8 = 0b110;
const OP_FISSION: u8 = 0b101;
const OP_FILL: u8 = 0b011;
const OP_VOID: u8 = 0b010;
const OP_GFILL: u8 = 0b001;
const OP_GVOID: u8 = 0b000;

/// Packed five-bit form of a near delta.
fn near_bits(d: IVec3) -> u8 {
    assert!(d.is_near_delta(), "{d} is not a near delta");
    ((d.x + 1) * 9 + (d.y + 1) * 3 + (d.z + 1)) as u8
}

/// Axis tag (1 = x, 2 = y, 3 = z) and signed length of a linear delta.
fn axis_and_len(d: IVec3) -> (u8, i32) {
    assert!(d.is_linear(), "{d} is not a linear delta");
    if d.x != 0 {
        (1, d.x)
    } else if d.y != 0 {
        (2, d.y)
    } else {
        (3, d.z)
    }
}

fn far_bytes(d: IVec3) -> [u8; 3] {
    assert!(d.is_far_delta(), "{d} is not a far delta");
    [(d.x + 30) as u8, (d.y + 30) as u8, (d.z + 30) as u8]
}

/// Appends the wire record for `cmd`.
pub(crate) fn encode_command(cmd: &Command, out: &mut Vec<u8>) {
    match *cmd {
        Command::Halt => out.push(OP_HALT),
        Command::Wait => out.push(OP_WAIT),
        Command::Flip => out.push(OP_FLIP),
        Command::Move { d, reversed } => {
            let (first, second) =
                Command::segments(d, reversed).expect("move delta has 1 or 2 segments");
            match second {
                None => {
                    assert!(first.is_long_linear(), "{first} exceeds a long move");
                    let (a, len) = axis_and_len(first);
                    out.push(a << 4 | OP_SMOVE);
                    out.push((len + 15) as u8);
                }
                Some(second) => {
                    assert!(
                        first.is_short_linear() && second.is_short_linear(),
                        "planar move segments {first}/{second} exceed short moves"
                    );
                    let (a1, l1) = axis_and_len(first);
                    let (a2, l2) = axis_and_len(second);
                    out.push(a2 << 6 | a1 << 4 | OP_LMOVE);
                    out.push(((l2 + 5) as u8) << 4 | (l1 + 5) as u8);
                }
            }
        }
        Command::FusionP { d } => out.push(near_bits(d) << 3 | OP_FUSION_P),
        Command::FusionS { d } => out.push(near_bits(d) << 3 | OP_FUSION_S),
        Command::Fission { d, m } => {
            out.push(near_bits(d) << 3 | OP_FISSION);
            out.push(m);
        }
        Command::Fill { d } => out.push(near_bits(d) << 3 | OP_FILL),
        Command::Void { d } => out.push(near_bits(d) << 3 | OP_VOID),
        Command::GFill { d, far } => {
            out.push(near_bits(d) << 3 | OP_GFILL);
            out.extend(far_bytes(far));
        }
        Command::GVoid { d, far } => {
            out.push(near_bits(d) << 3 | OP_GVOID);
            out.extend(far_bytes(far));
        }
    }
}
