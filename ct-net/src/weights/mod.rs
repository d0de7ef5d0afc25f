//! The weight file is a plain concatenation of arrays, without any global header.
//! Each array is stored as a little-endian `i32` rank, followed by `rank` `i32` dimensions and then the `f32` data
//! in row-major order. The arrays appear in the order listed by [TowerShape::param_shapes].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::model::{ContrastNet, TowerShape};
use crate::weights::load::net_from_weight_bytes;
use crate::weights::save::write_weights as write_weights_impl;

mod load;
pub mod result;
mod save;

pub use result::{ToWeightsResult, WeightsError, WeightsResult};

pub fn load_weights_from_path(path: impl AsRef<Path>, shape: TowerShape) -> WeightsResult<ContrastNet> {
    let path = path.as_ref();
    let buf = std::fs::read(path).to_weights_result(path)?;
    let net = net_from_weight_bytes(&buf, shape)?;

    tracing::info!(
        "Loaded weights from {:?}: {} blocks, {} arrays, {} parameters",
        path,
        shape.tower_depth,
        shape.param_shapes().len(),
        net.param_count()
    );
    Ok(net)
}

pub fn load_weights_from_bytes(buffer: &[u8], shape: TowerShape) -> WeightsResult<ContrastNet> {
    net_from_weight_bytes(buffer, shape)
}

pub fn write_weights(writer: &mut impl Write, net: &ContrastNet) -> std::io::Result<()> {
    write_weights_impl(writer, net)
}

pub fn weights_to_bytes(net: &ContrastNet) -> Vec<u8> {
    let mut buf = vec![];
    write_weights_impl(&mut buf, net).expect("Writing to a Vec does not fail");
    buf
}

pub fn save_weights(path: impl AsRef<Path>, net: &ContrastNet) -> WeightsResult<()> {
    let path = path.as_ref();
    let file = File::create(path).to_weights_result(path)?;

    let mut writer = BufWriter::new(file);
    write_weights_impl(&mut writer, net).to_weights_result(path)?;
    writer.flush().to_weights_result(path)?;

    tracing::debug!("Saved weights to {:?}", path);
    Ok(())
}
