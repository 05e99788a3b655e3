//! Constant buffer packing through the public API

use shader_bridge::constants::layout::SLOT_SIZE;
use shader_bridge::gpu::types::{Bool3, Double2, Float2, Float3, Float4, Int3, UInt2};
use shader_bridge::gpu::PackedEntry;
use shader_bridge::*;

fn every_small_kind() -> Vec<ShaderValue> {
    vec![
        ShaderValue::Bool(true),
        ShaderValue::Float3(Float3::new(1.0, 2.0, 3.0)),
        ShaderValue::Int(-4),
        ShaderValue::Float2(Float2::new(5.0, 6.0)),
        ShaderValue::Bool3(Bool3::new(true, false, true)),
        ShaderValue::Double(7.5),
        ShaderValue::UInt2(UInt2::new(8, 9)),
        ShaderValue::Float4(Float4::new(1.0, 1.0, 1.0, 1.0)),
        ShaderValue::Vector3(glam::Vec3::new(0.1, 0.2, 0.3)),
        ShaderValue::Double2(Double2::new(1.0, 2.0)),
        ShaderValue::Int3(Int3::new(1, 2, 3)),
        ShaderValue::UInt(11),
        ShaderValue::Vector2(glam::Vec2::new(3.0, 4.0)),
    ]
}

#[test]
fn test_values_never_straddle_a_register() {
    let layout = pack(&every_small_kind());

    for PackedEntry { offset, size, kind } in &layout.entries {
        assert!(*size <= SLOT_SIZE);
        assert_eq!(
            offset / SLOT_SIZE,
            (offset + size - 1) / SLOT_SIZE,
            "{:?} at {} crosses a register boundary",
            kind,
            offset
        );
    }
}

#[test]
fn test_one_register_per_value_is_enough() {
    let values = every_small_kind();
    let layout = pack(&values);

    assert!(layout.used <= SLOT_SIZE * values.len());
    assert_eq!(layout.slot_count, values.len());
    assert_eq!(layout.size(), SLOT_SIZE * values.len());
}

#[test]
fn test_entries_are_ordered_and_disjoint() {
    let layout = pack(&every_small_kind());

    for pair in layout.entries.windows(2) {
        assert!(pair[0].offset + pair[0].size <= pair[1].offset);
    }
}

#[test]
fn test_reflected_scenario_matches_typed_packing() {
    let reflected = pack_reflected(&[&true, &5i32, &Float3::new(1.0, 2.0, 3.0)]).unwrap();
    let typed = pack(&[
        ShaderValue::Bool(true),
        ShaderValue::Int(5),
        ShaderValue::Float3(Float3::new(1.0, 2.0, 3.0)),
    ]);

    assert_eq!(reflected, typed);
    let offsets: Vec<usize> = reflected.entries.iter().map(|e| e.offset).collect();
    assert_eq!(offsets, vec![0, 4, 16]);
}

#[test]
fn test_uploaded_registers_read_back() {
    let allocator = HostBufferAllocator::new();
    let buffer = allocate_constant_buffer(
        &allocator,
        &[&glam::Vec4::new(1.0, 2.0, 3.0, 4.0), &0.5f32, &glam::Vec2::new(6.0, 7.0)],
    )
    .unwrap();

    let slots = buffer.slots();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0], glam::Vec4::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(slots[1], glam::Vec4::new(0.5, 6.0, 7.0, 0.0));
    assert_eq!(slots[2], glam::Vec4::ZERO);
}

#[test]
fn test_unsupported_type_reports_index_and_allocates_nothing() {
    let allocator = HostBufferAllocator::new();
    let err = allocate_constant_buffer(&allocator, &[&true, &5i32, &3u8]).unwrap_err();

    assert_eq!(
        err,
        PackError::UnsupportedValueType {
            index: 2,
            type_name: "u8"
        }
    );
    assert_eq!(err.to_string(), "Value 2 has unsupported type u8");
    assert_eq!(allocator.allocations(), 0);
}

#[test]
fn test_prebuilt_shader_values_pass_through_reflection() {
    let value = ShaderValue::Int(9);
    let layout = pack_reflected(&[&value]).unwrap();
    assert_eq!(layout.entries[0].kind, ValueKind::Int);
    assert_eq!(&layout.bytes[0..4], &9i32.to_ne_bytes());
}

#[test]
fn test_debug_string_lists_values() {
    let layout = pack(&[ShaderValue::Bool(false), ShaderValue::Double(1.0)]);
    let text = layout.debug_string();

    assert!(text.starts_with("Total size: 32 bytes (2 slots, 12 used)\n"));
    assert!(text.contains("bool"));
    assert!(text.contains("double"));
}
