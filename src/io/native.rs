//! Binary forest persistence.
//!
//! Little-endian layout:
//!
//! ```text
//! u64 num_variables
//! u32 tree_type_tag            1 = classification
//! vector<f64> class_values
//! per tree, until end of stream:
//!     vector<vector<u64>> child_node_ids   outer length 2: left row, right row
//!     vector<u64>         split_var_ids
//!     vector<f64>         split_values
//! ```
//!
//! `vector<T>` is a `u64` element count followed by that many contiguous
//! elements. Node and variable IDs are stored as `u64` regardless of the
//! platform's pointer width.

use std::io::{self, Read, Write};

use crate::error::ForestError;
use crate::forest::Forest;
use crate::tree::Tree;

/// Tag identifying a classification forest.
pub const TREE_TYPE_CLASSIFICATION: u32 = 1;

/// Serialize `forest` into `writer`.
pub fn save_forest<W: Write>(forest: &Forest, writer: &mut W) -> Result<(), ForestError> {
    writer.write_all(&(forest.num_variables() as u64).to_le_bytes())?;
    writer.write_all(&TREE_TYPE_CLASSIFICATION.to_le_bytes())?;
    write_f64_vector(writer, forest.class_values())?;

    for tree in forest.trees() {
        writer.write_all(&2u64.to_le_bytes())?;
        write_u64_vector(writer, tree.child_left_ids())?;
        write_u64_vector(writer, tree.child_right_ids())?;
        write_u64_vector(writer, tree.split_var_ids())?;
        write_f64_vector(writer, tree.split_values())?;
    }
    Ok(())
}

/// Load a forest saved by [`save_forest`].
///
/// `num_variables` and `dependent_var_id` describe the dataset the forest
/// will be applied to; `seed` drives majority-vote tie-breaks. When the
/// saved variable count exceeds `num_variables`, the dependent column is
/// assumed dropped from the prediction-time dataset and every split
/// variable at or above `dependent_var_id` is shifted down by one.
pub fn load_forest<R: Read>(
    reader: &mut R,
    num_variables: usize,
    dependent_var_id: usize,
    seed: u64,
) -> Result<Forest, ForestError> {
    let num_variables_saved = read_u64(reader)?;
    let tag = read_u32(reader)?;
    if tag != TREE_TYPE_CLASSIFICATION {
        return Err(ForestError::WrongTreeType {
            expected: TREE_TYPE_CLASSIFICATION,
            got: tag,
        });
    }
    let class_values = read_f64_vector(reader)?;
    let shift_vars = num_variables_saved > num_variables as u64;

    let mut trees = Vec::new();
    while let Some(outer_len) = try_read_u64(reader)? {
        if outer_len != 2 {
            return Err(corrupt(format!(
                "expected 2 child rows per tree, found {outer_len}"
            )));
        }
        let child_left = read_usize_vector(reader)?;
        let child_right = read_usize_vector(reader)?;
        let mut split_var_ids = read_usize_vector(reader)?;
        let split_values = read_f64_vector(reader)?;

        let num_nodes = child_left.len();
        if num_nodes == 0 {
            return Err(corrupt("tree with no nodes".to_string()));
        }
        if child_right.len() != num_nodes
            || split_var_ids.len() != num_nodes
            || split_values.len() != num_nodes
        {
            return Err(corrupt("tree arrays have mismatched lengths".to_string()));
        }
        if child_left.iter().chain(&child_right).any(|&c| c >= num_nodes) {
            return Err(corrupt("child node ID out of range".to_string()));
        }

        if shift_vars {
            // Leaves store 0 in the split-variable slot; only internal
            // nodes carry a real variable ID to shift.
            for node in 0..num_nodes {
                let is_leaf = child_left[node] == 0 && child_right[node] == 0;
                if !is_leaf && split_var_ids[node] >= dependent_var_id {
                    split_var_ids[node] -= 1;
                }
            }
        }
        trees.push(Tree::from_arrays(
            child_left,
            child_right,
            split_var_ids,
            split_values,
        ));
    }
    if trees.is_empty() {
        return Err(corrupt("forest with no trees".to_string()));
    }

    Ok(Forest::new(
        trees,
        class_values,
        num_variables,
        dependent_var_id,
        seed,
    ))
}

fn corrupt(message: String) -> ForestError {
    ForestError::Io(io::Error::new(io::ErrorKind::InvalidData, message))
}

fn write_u64_vector<W: Write>(writer: &mut W, values: &[usize]) -> io::Result<()> {
    writer.write_all(&(values.len() as u64).to_le_bytes())?;
    for &value in values {
        writer.write_all(&(value as u64).to_le_bytes())?;
    }
    Ok(())
}

fn write_f64_vector<W: Write>(writer: &mut W, values: &[f64]) -> io::Result<()> {
    writer.write_all(&(values.len() as u64).to_le_bytes())?;
    for &value in values {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Read a `u64`, or `None` on a clean end of stream.
fn try_read_u64<R: Read>(reader: &mut R) -> Result<Option<u64>, ForestError> {
    let mut buf = [0u8; 8];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(corrupt("truncated stream".to_string())),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Some(u64::from_le_bytes(buf)))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64, ForestError> {
    try_read_u64(reader)?.ok_or_else(|| corrupt("unexpected end of stream".to_string()))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, ForestError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_usize<R: Read>(reader: &mut R) -> Result<usize, ForestError> {
    let value = read_u64(reader)?;
    usize::try_from(value).map_err(|_| corrupt(format!("value {value} exceeds platform width")))
}

// Elements are read one at a time so a corrupt length fails at the first
// missing element instead of provoking a huge allocation.
fn read_usize_vector<R: Read>(reader: &mut R) -> Result<Vec<usize>, ForestError> {
    let len = read_usize(reader)?;
    let mut values = Vec::new();
    for _ in 0..len {
        values.push(read_usize(reader)?);
    }
    Ok(values)
}

fn read_f64_vector<R: Read>(reader: &mut R) -> Result<Vec<f64>, ForestError> {
    let len = read_usize(reader)?;
    let mut values = Vec::new();
    for _ in 0..len {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        values.push(f64::from_le_bytes(buf));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump_forest() -> Forest {
        let tree = Tree::from_arrays(
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![0, 0, 0],
            vec![3.0, 0.0, 1.0],
        );
        Forest::new(vec![tree], vec![0.0, 1.0], 2, 1, 42)
    }

    #[test]
    fn header_layout() {
        let mut blob = Vec::new();
        save_forest(&stump_forest(), &mut blob).unwrap();

        // u64 num_variables, u32 tag, u64 class count, two f64 classes.
        assert_eq!(&blob[..8], &2u64.to_le_bytes());
        assert_eq!(&blob[8..12], &1u32.to_le_bytes());
        assert_eq!(&blob[12..20], &2u64.to_le_bytes());
        assert_eq!(&blob[20..28], &0.0f64.to_le_bytes());
        assert_eq!(&blob[28..36], &1.0f64.to_le_bytes());
        // First tree: outer child vector has length 2.
        assert_eq!(&blob[36..44], &2u64.to_le_bytes());
    }

    #[test]
    fn round_trip_preserves_arrays() {
        let forest = stump_forest();
        let mut blob = Vec::new();
        save_forest(&forest, &mut blob).unwrap();

        let loaded = load_forest(&mut blob.as_slice(), 2, 1, 42).unwrap();
        assert_eq!(loaded, forest);
    }

    #[test]
    fn rejects_wrong_tree_type() {
        let mut blob = Vec::new();
        save_forest(&stump_forest(), &mut blob).unwrap();
        // Overwrite the tag.
        blob[8..12].copy_from_slice(&5u32.to_le_bytes());

        let err = load_forest(&mut blob.as_slice(), 2, 1, 42).unwrap_err();
        assert!(matches!(
            err,
            ForestError::WrongTreeType { expected: 1, got: 5 }
        ));
    }

    #[test]
    fn rejects_truncated_stream() {
        let mut blob = Vec::new();
        save_forest(&stump_forest(), &mut blob).unwrap();
        blob.truncate(blob.len() - 3);

        assert!(load_forest(&mut blob.as_slice(), 2, 1, 42).is_err());
    }

    #[test]
    fn rejects_out_of_range_child() {
        let tree = Tree::from_arrays(vec![1, 0, 0], vec![9, 0, 0], vec![0, 0, 0], vec![3.0, 0.0, 1.0]);
        let forest = Forest::new(vec![tree], vec![0.0, 1.0], 2, 1, 42);
        let mut blob = Vec::new();
        save_forest(&forest, &mut blob).unwrap();

        assert!(load_forest(&mut blob.as_slice(), 2, 1, 42).is_err());
    }

    #[test]
    fn shifts_split_vars_when_dependent_column_dropped() {
        // Saved against 4 variables with the response at column 1; the
        // tree splits on variables 0 and 2.
        let tree = Tree::from_arrays(
            vec![1, 0, 3, 0, 0],
            vec![2, 0, 4, 0, 0],
            vec![2, 0, 0, 0, 0],
            vec![5.0, 0.0, 3.0, 0.0, 1.0],
        );
        let forest = Forest::new(vec![tree], vec![0.0, 1.0], 4, 1, 42);
        let mut blob = Vec::new();
        save_forest(&forest, &mut blob).unwrap();

        // Loaded against 3 variables: the response column is gone, so
        // split variables >= 1 shift down.
        let loaded = load_forest(&mut blob.as_slice(), 3, 1, 42).unwrap();
        assert_eq!(loaded.trees()[0].split_var_id(0), 1);
        assert_eq!(loaded.trees()[0].split_var_id(2), 0);
    }

    #[test]
    fn shift_leaves_leaf_nodes_alone_when_response_is_column_zero() {
        // Saved against 3 variables with the response at column 0; the
        // tree splits on variables 1 and 2.
        let tree = Tree::from_arrays(
            vec![1, 0, 3, 0, 0],
            vec![2, 0, 4, 0, 0],
            vec![1, 0, 2, 0, 0],
            vec![5.0, 0.0, 3.0, 0.0, 1.0],
        );
        let forest = Forest::new(vec![tree], vec![0.0, 1.0], 3, 0, 42);
        let mut blob = Vec::new();
        save_forest(&forest, &mut blob).unwrap();

        // Loaded against 2 variables with the response column dropped:
        // every internal split variable is >= 0 and shifts down, while
        // the leaves' zero slots must not underflow.
        let loaded = load_forest(&mut blob.as_slice(), 2, 0, 42).unwrap();
        let tree = &loaded.trees()[0];
        assert_eq!(tree.split_var_id(0), 0);
        assert_eq!(tree.split_var_id(2), 1);
        for node in [1, 3, 4] {
            assert!(tree.is_leaf(node));
            assert_eq!(tree.split_var_id(node), 0);
        }
    }

    #[test]
    fn empty_stream_is_an_error() {
        assert!(load_forest(&mut [].as_slice(), 2, 1, 42).is_err());
    }

    #[test]
    fn header_without_trees_is_an_error() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&2u64.to_le_bytes());
        blob.extend_from_slice(&1u32.to_le_bytes());
        blob.extend_from_slice(&0u64.to_le_bytes());

        assert!(load_forest(&mut blob.as_slice(), 2, 1, 42).is_err());
    }
}
