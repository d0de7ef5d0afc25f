use std::io;
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::model::ContrastNet;
use crate::tensor::Tensor;

pub fn write_weights(writer: &mut impl Write, net: &ContrastNet) -> io::Result<()> {
    for (_, tensor) in net.named_params() {
        write_array(writer, tensor)?;
    }
    Ok(())
}

fn write_array(writer: &mut impl Write, tensor: &Tensor) -> io::Result<()> {
    let dims = &tensor.shape().dims;
    writer.write_i32::<LittleEndian>(dims.len() as i32)?;
    for &d in dims {
        writer.write_i32::<LittleEndian>(d as i32)?;
    }
    for &x in tensor.data() {
        writer.write_f32::<LittleEndian>(x)?;
    }
    Ok(())
}
