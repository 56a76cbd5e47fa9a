//! Post-processing dump of the final field, gathered through rank 0.

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use mpi::topology::CartesianCommunicator;
use mpi::traits::Communicator;
use mpi::traits::Destination;
use mpi::traits::Source;

use crate::communication::coords_tag;
use crate::communication::field_tag;
use crate::communication::Rank;
use crate::field::Field;
use crate::topology::Subdomain;

pub const OUTPUT_PATH: &str = "output/out.dat";

/// Writes one header and one zone per rank, in rank order. Rank 0 writes
/// its own zone first and then drains the tagged field and coordinate
/// payloads of every other rank. All subdomains have identical extents.
pub fn write_field_dump(
    comm: &CartesianCommunicator,
    subdomain: &Subdomain,
    field: &Field,
) -> io::Result<()> {
    let values = zone_values(field);
    let coords = zone_coords(subdomain);
    if comm.rank() == 0 {
        let path = Path::new(OUTPUT_PATH);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        write_header(&mut writer)?;
        write_zone(&mut writer, 0, subdomain.extents, &coords, &values)?;
        for rank in 1..comm.size() {
            let mut remote_values = vec![0.0; values.len()];
            let mut remote_coords = vec![0.0; coords.len()];
            let process = comm.process_at_rank(rank);
            process.receive_into_with_tag(&mut remote_values[..], field_tag(rank));
            process.receive_into_with_tag(&mut remote_coords[..], coords_tag(rank));
            write_zone(
                &mut writer,
                rank,
                subdomain.extents,
                &remote_coords,
                &remote_values,
            )?;
        }
        writer.flush()?;
    } else {
        let root = comm.process_at_rank(0);
        root.send_with_tag(&values[..], field_tag(comm.rank()));
        root.send_with_tag(&coords[..], coords_tag(comm.rank()));
    }
    Ok(())
}

/// Field values in i-fastest order.
fn zone_values(field: &Field) -> Vec<f64> {
    let [nx, ny, nz] = field.extents();
    let mut values = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                values.push(field[[i, j, k]]);
            }
        }
    }
    values
}

/// Node coordinates, three per node, in i-fastest order.
fn zone_coords(subdomain: &Subdomain) -> Vec<f64> {
    let [nx, ny, nz] = subdomain.extents;
    let mut coords = Vec::with_capacity(3 * nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                coords.push(subdomain.global_position(0, i));
                coords.push(subdomain.global_position(1, j));
                coords.push(subdomain.global_position(2, k));
            }
        }
    }
    coords
}

fn write_header<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(writer, "TITLE = \"3D transient heat conduction\"")?;
    writeln!(writer, "VARIABLES = \"X\", \"Y\", \"Z\", \"T\"")
}

fn write_zone<W: Write>(
    writer: &mut W,
    rank: Rank,
    extents: [usize; 3],
    coords: &[f64],
    values: &[f64],
) -> io::Result<()> {
    let [nx, ny, nz] = extents;
    writeln!(
        writer,
        "ZONE T=\"rank {}\", I={}, J={}, K={}, DATAPACKING=POINT",
        rank, nx, ny, nz
    )?;
    for (node, value) in values.iter().enumerate() {
        writeln!(
            writer,
            "{:.6e} {:.6e} {:.6e} {:.6e}",
            coords[3 * node],
            coords[3 * node + 1],
            coords[3 * node + 2],
            value
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write_header;
    use super::write_zone;
    use super::zone_coords;
    use super::zone_values;
    use crate::field::Field;
    use crate::parameters::Parameters;
    use crate::test_utils::assert_is_close;
    use crate::topology::NeighbourTable;
    use crate::topology::Subdomain;

    #[test]
    fn zone_data_is_i_fastest() {
        let mut field = Field::zeros([3, 3, 3]);
        field[[1, 0, 0]] = 1.0;
        field[[0, 1, 0]] = 2.0;
        field[[0, 0, 1]] = 3.0;
        let values = zone_values(&field);
        assert_eq!(values.len(), 27);
        assert_is_close(values[1], 1.0);
        assert_is_close(values[3], 2.0);
        assert_is_close(values[9], 3.0);
    }

    #[test]
    fn coordinates_are_global() {
        let parameters = Parameters::new([5, 5, 5], 1, 0.0).unwrap();
        let subdomain = Subdomain::new(
            &parameters,
            [2, 1, 1],
            [1, 0, 0],
            NeighbourTable::default(),
        );
        let coords = zone_coords(&subdomain);
        // First node of the upper X subdomain sits on the split plane.
        assert_is_close(coords[0], 0.5);
        assert_is_close(coords[1], 0.0);
        assert_is_close(coords[2], 0.0);
        // Second node along i.
        assert_is_close(coords[3], 0.75);
    }

    #[test]
    fn zone_block_format() {
        let mut buffer = Vec::new();
        write_header(&mut buffer).unwrap();
        let field = Field::zeros([2, 2, 2]);
        let parameters = Parameters::new([2, 2, 2], 1, 0.0).unwrap();
        let subdomain = Subdomain::new(
            &parameters,
            [1, 1, 1],
            [0, 0, 0],
            NeighbourTable::default(),
        );
        write_zone(
            &mut buffer,
            0,
            field.extents(),
            &zone_coords(&subdomain),
            &zone_values(&field),
        )
        .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("TITLE"));
        assert!(text.contains("VARIABLES = \"X\", \"Y\", \"Z\", \"T\""));
        assert!(text.contains("ZONE T=\"rank 0\", I=2, J=2, K=2, DATAPACKING=POINT"));
        assert_eq!(text.lines().count(), 3 + 8);
    }
}
