use std::io::Cursor;

use ply::layout::{FieldTag, Layout};
use ply::numeric::RawScalar;
use ply::{convert, DataKind, ElementDataBlock, Format, PlyReader, PlyWriter};

const CUBE: &str = "ply\nformat ascii 1.0\ncomment cube mesh\nelement vertex 8\nproperty float x\nproperty float y\nproperty float z\nelement face 6\nproperty list uchar int vertex_indices\nend_header\n-1 -1 -1\n1 -1 -1\n1 1 -1\n-1 1 -1\n-1 -1 1\n1 -1 1\n1 1 1\n-1 1 1\n4 0 1 2 3\n4 7 6 5 4\n4 0 4 5 1\n4 1 5 6 2\n4 2 6 7 3\n4 3 7 4 0\n";

#[test]
fn cube_ascii_to_binary_le_round_trips_exactly() {
    let binary = convert(Cursor::new(CUBE.as_bytes().to_vec()), Vec::new(), Format::BinaryLittleEndian).unwrap();
    let back = convert(Cursor::new(binary), Vec::new(), Format::Ascii).unwrap();
    assert_eq!(String::from_utf8(back).unwrap(), CUBE);
}

#[test]
fn partial_property_read_ignores_trailing_columns() {
    let mut reader = PlyReader::new(Cursor::new(CUBE.as_bytes().to_vec())).unwrap();
    let layout = Layout::new(vec![FieldTag::Scalar(DataKind::Float32)]);
    let records = reader.read_element_with_layout(&layout).unwrap();
    assert_eq!(records.fixed.len(), 8 * 4);
    let first_x = f32::from_ne_bytes(records.fixed[0..4].try_into().unwrap());
    assert_eq!(first_x, -1.0);
}

#[test]
fn widening_conversion_from_float32_to_float64() {
    let mut reader = PlyReader::new(Cursor::new(CUBE.as_bytes().to_vec())).unwrap();
    let layout = Layout::new(vec![FieldTag::Pack(DataKind::Float64, 3)]);
    let records = reader.read_element_with_layout(&layout).unwrap();
    assert_eq!(records.fixed.len(), 8 * 3 * 8);
    let first_x = f64::from_ne_bytes(records.fixed[0..8].try_into().unwrap());
    assert_eq!(first_x, -1.0_f64);
}

#[test]
fn comments_round_trip_at_their_original_position() {
    let binary = convert(Cursor::new(CUBE.as_bytes().to_vec()), Vec::new(), Format::BinaryBigEndian).unwrap();
    let back = convert(Cursor::new(binary), Vec::new(), Format::Ascii).unwrap();
    let text = String::from_utf8(back).unwrap();
    assert!(text.contains("comment cube mesh"));
    assert!(text.find("comment cube mesh").unwrap() < text.find("element vertex").unwrap());
}

#[test]
fn comments_at_lines_two_three_five_seven_round_trip_byte_identically() {
    const HEADER: &str = "ply\nformat ascii 1.0\ncomment\ncomment\nelement vertex 1\ncomment\nproperty float x\ncomment\nend_header\n1\n";

    let mut reader = PlyReader::new(Cursor::new(HEADER.as_bytes().to_vec())).unwrap();
    let comments = reader.comments().to_vec();
    assert_eq!(
        comments.iter().map(|c| c.line).collect::<Vec<_>>(),
        vec![2, 3, 5, 7]
    );
    assert!(comments.iter().all(|c| c.text.is_empty()));

    let block = reader.read_element().unwrap();
    let mut writer = PlyWriter::with_comments(Format::Ascii, comments);
    writer.add(block);
    let bytes = writer.write(Vec::new()).unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), HEADER);
}

#[test]
fn list_and_scalar_properties_interleave_correctly() {
    let element = ply::Element::new(
        "edge",
        1,
        vec![
            ply::Property::scalar("weight", DataKind::Float32),
            ply::Property::list("endpoints", DataKind::UInt8, DataKind::Int32),
            ply::Property::scalar("active", DataKind::UInt8),
        ],
    );
    let mut block = ElementDataBlock::new(element);
    block.push_scalar(RawScalar::F32(0.5));
    block.push_list(1, vec![RawScalar::I32(0), RawScalar::I32(1)]);
    block.push_scalar(RawScalar::U8(1));

    let mut writer = PlyWriter::new(Format::Ascii);
    writer.add(block);
    let bytes = writer.write(Vec::new()).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.ends_with("0.5 2 0 1 1\n"));
}

#[test]
fn trailing_variable_length_list_can_be_skipped() {
    let mut reader = PlyReader::new(Cursor::new(CUBE.as_bytes().to_vec())).unwrap();
    assert!(reader.find("face").unwrap());
    reader.skip_element().unwrap();
    assert!(reader.current_element().is_none());
}

#[test]
fn binary_memcpy_fast_path_preserves_values() {
    let binary = convert(Cursor::new(CUBE.as_bytes().to_vec()), Vec::new(), Format::BinaryLittleEndian).unwrap();
    let mut reader = PlyReader::new(Cursor::new(binary)).unwrap();
    let layout = Layout::new(vec![FieldTag::Pack(DataKind::Float32, 3)]);
    let records = reader.read_element_with_layout(&layout).unwrap();
    assert_eq!(records.fixed.len(), 8 * 3 * 4);
    let last_z_offset = 7 * 12 + 8;
    let last_z = f32::from_ne_bytes(records.fixed[last_z_offset..last_z_offset + 4].try_into().unwrap());
    assert_eq!(last_z, 1.0);
}
