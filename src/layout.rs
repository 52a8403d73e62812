//! Component E — the layout planner (SPEC_FULL.md §4.3).
//!
//! New logic with no direct teacher analogue; pointer-width selection
//! generalizes the teacher's `IDAKind`/`IDAVariants` generic-address-width
//! idiom (a small closed set of address widths chosen once per file) down
//! to the four-way width this domain needs, chosen once per message
//! instead of once per database.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::model::{MemberSlot, TagsBlock};

/// The width of every dynamic pointer slot within one message's head, or
/// the (always-Eight) width of a tail's pointers. `IntoPrimitive`/
/// `TryFromPrimitive` give the byte-width <-> variant conversion, the same
/// pattern the teacher uses for its own small closed address-width sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum PointerWidth {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
}

impl PointerWidth {
    pub fn bytes(self) -> u64 {
        u8::from(self) as u64
    }

    /// Number of distinct byte offsets this width can address: `2^(8w)`.
    fn capacity(self) -> u128 {
        1u128 << (8 * self.bytes())
    }
}

/// The smallest width able to address any byte offset in `0..head_size`
/// (SPEC_FULL.md §4.3; DESIGN.md records the inclusive-bound decision for
/// the `head_size == capacity` boundary case).
pub fn choose_pointer_width(head_size: u32) -> PointerWidth {
    for width in [PointerWidth::One, PointerWidth::Two, PointerWidth::Four, PointerWidth::Eight] {
        if (head_size as u128) <= width.capacity() {
            return width;
        }
    }
    PointerWidth::Eight
}

/// Implicit head header: 4-byte message id + 4-byte tail size.
pub const HEAD_HEADER_SIZE: u64 = 8;

/// Fixed-width contribution of one member slot within a head whose pointer
/// width has already been chosen.
pub fn member_fixed_contribution(slot: &MemberSlot, pointer_width: PointerWidth) -> u64 {
    match slot {
        MemberSlot::Field(member) => member.ty.fixed_size().unwrap_or(pointer_width.bytes()),
        MemberSlot::Tags(_) => pointer_width.bytes(),
    }
}

/// The fixed part of a head section: the 8-byte header plus each member's
/// fixed or pointer contribution, in order (SPEC_FULL.md §4.3, global
/// invariant 6).
pub fn head_fixed_part_size(members: &[MemberSlot], pointer_width: PointerWidth) -> u64 {
    HEAD_HEADER_SIZE
        + members.iter().map(|m| member_fixed_contribution(m, pointer_width)).sum::<u64>()
}

/// The fixed part of a tail section: an 8-byte pointer per top-level
/// member (each of which is a TagsBlock; see SPEC_FULL.md §3 TailSection).
/// Tail pointers are always 8 bytes wide regardless of tail length.
pub fn tail_fixed_part_size(members: &[MemberSlot]) -> u64 {
    8 * members.len() as u64
}

/// Number of `(tag, value)` pairs a TagsBlock may emit; used to size the
/// payload alongside the varint terminator.
pub fn tags_block_present_count(block: &TagsBlock) -> usize {
    block.members.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, PointerWidth::One)]
    #[case(1, PointerWidth::One)]
    #[case(256, PointerWidth::One)]
    #[case(257, PointerWidth::Two)]
    #[case(65536, PointerWidth::Two)]
    #[case(65537, PointerWidth::Four)]
    #[case(1u32 << 31, PointerWidth::Four)]
    fn pointer_width_matches_capacity_thresholds(#[case] head_size: u32, #[case] expected: PointerWidth) {
        assert_eq!(choose_pointer_width(head_size), expected);
    }

    #[test]
    fn head_header_is_always_eight_bytes() {
        assert_eq!(head_fixed_part_size(&[], PointerWidth::One), HEAD_HEADER_SIZE);
    }

    #[test]
    fn tail_pointer_width_is_always_eight() {
        use crate::model::{Member, MemberSlot, TagsBlock};
        use crate::types::Type;

        let tags = MemberSlot::Tags(TagsBlock {
            members: vec![Member {
                name: "a".into(),
                tag: Some(1),
                ty: Type::Integer { fixed_size: 4, signed: false },
            }],
        });
        assert_eq!(tail_fixed_part_size(&[tags.clone(), tags]), 16);
    }
}
