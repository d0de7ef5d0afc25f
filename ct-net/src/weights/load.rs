use std::io;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::model::{ContrastNet, TowerShape};
use crate::shape::Shape;
use crate::tensor::Tensor;
use crate::weights::result::{WeightsError, WeightsResult};

/// Arbitrary sanity limit, the network itself never goes beyond rank 4.
const MAX_RANK: i32 = 8;

pub fn net_from_weight_bytes(mut buf: &[u8], shape: TowerShape) -> WeightsResult<ContrastNet> {
    let expected = shape.param_shapes();
    let mut params = Vec::with_capacity(expected.len());

    for (name, expected_shape) in expected {
        let tensor = read_array(&mut buf, &name)?;

        if tensor.shape() != &expected_shape {
            return Err(WeightsError::ShapeMismatch {
                name,
                expected: expected_shape,
                actual: tensor.shape().clone(),
            });
        }

        params.push(tensor);
    }

    if !buf.is_empty() {
        return Err(WeightsError::TrailingData { count: buf.len() });
    }

    Ok(ContrastNet::from_params(shape, params))
}

fn read_array(buf: &mut &[u8], name: &str) -> WeightsResult<Tensor> {
    let truncated = |_: io::Error| WeightsError::Truncated { name: name.to_owned() };

    let rank = buf.read_i32::<LittleEndian>().map_err(truncated)?;
    if !(0..=MAX_RANK).contains(&rank) {
        return Err(WeightsError::InvalidRank {
            name: name.to_owned(),
            rank,
        });
    }

    let dims = (0..rank)
        .map(|_| buf.read_i32::<LittleEndian>())
        .collect::<io::Result<Vec<i32>>>()
        .map_err(truncated)?;
    if dims.iter().any(|&d| d < 0) {
        return Err(WeightsError::InvalidDim {
            name: name.to_owned(),
            dims,
        });
    }

    let size = dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d as usize));
    let size = match size {
        Some(size) => size,
        None => {
            return Err(WeightsError::InvalidDim {
                name: name.to_owned(),
                dims,
            })
        }
    };

    // check the length up front so a corrupt header can't trigger a huge allocation
    let byte_len = size.checked_mul(4);
    if byte_len.map_or(true, |len| len > buf.len()) {
        return Err(WeightsError::Truncated { name: name.to_owned() });
    }

    let shape = Shape::new(dims.iter().map(|&d| d as usize).collect());
    let mut data = vec![0.0; size];
    buf.read_f32_into::<LittleEndian>(&mut data).map_err(truncated)?;

    Ok(Tensor::from_data(shape, data))
}

#[cfg(test)]
mod test {
    use byteorder::{LittleEndian, WriteBytesExt};

    use crate::weights::load::read_array;
    use crate::weights::result::WeightsError;

    fn header(dims: &[i32]) -> Vec<u8> {
        let mut buf = vec![];
        buf.write_i32::<LittleEndian>(dims.len() as i32).unwrap();
        for &d in dims {
            buf.write_i32::<LittleEndian>(d).unwrap();
        }
        buf
    }

    #[test]
    fn read_single_array() {
        let mut bytes = header(&[2, 2]);
        for x in [1.0f32, -2.0, 3.5, 0.25] {
            bytes.write_f32::<LittleEndian>(x).unwrap();
        }

        let mut buf = bytes.as_slice();
        let tensor = read_array(&mut buf, "x").unwrap();
        assert_eq!(tensor.shape().dims, vec![2, 2]);
        assert_eq!(tensor.data(), &[1.0, -2.0, 3.5, 0.25]);
        assert!(buf.is_empty());
    }

    #[test]
    fn negative_dim() {
        let bytes = header(&[3, -1]);
        let result = read_array(&mut bytes.as_slice(), "x");
        assert!(matches!(result, Err(WeightsError::InvalidDim { .. })));
    }

    #[test]
    fn huge_rank() {
        let bytes = header(&[1; 20]);
        let result = read_array(&mut bytes.as_slice(), "x");
        assert!(matches!(result, Err(WeightsError::InvalidRank { rank: 20, .. })));
    }

    #[test]
    fn overflowing_dims() {
        let bytes = header(&[i32::MAX, i32::MAX, i32::MAX]);
        let result = read_array(&mut bytes.as_slice(), "x");
        assert!(matches!(result, Err(WeightsError::InvalidDim { dims, .. }) if dims.len() == 3));
    }

    #[test]
    fn oversized_dims() {
        // fits in usize but not in the remaining bytes
        let bytes = header(&[i32::MAX, 4]);
        let result = read_array(&mut bytes.as_slice(), "x");
        assert!(matches!(result, Err(WeightsError::Truncated { .. })));
    }

    #[test]
    fn missing_data() {
        let mut bytes = header(&[4]);
        bytes.write_f32::<LittleEndian>(1.0).unwrap();
        let result = read_array(&mut bytes.as_slice(), "short");
        assert!(matches!(result, Err(WeightsError::Truncated { name }) if name == "short"));
    }
}
