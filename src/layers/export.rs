use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path as FsPath,
};

use super::{error::Error, graph::Graph, path::Path};

/// Maps network coordinates (feet) onto the pixels of a map image
#[derive(Debug, Clone, Copy)]
pub struct CoordinateTransform {
    pub map_width_feet: i64,
    pub map_height_feet: i64,
    pub map_width_pixels: i64,
    pub map_height_pixels: i64,
    /// Pixels cropped from the left of the map
    pub crop_left: i64,
    /// Pixels cropped from the top of the map
    pub crop_down: i64,
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        CoordinateTransform {
            map_width_feet: 5521,
            map_height_feet: 4369,
            map_width_pixels: 2528,
            map_height_pixels: 2000,
            crop_left: 150,
            crop_down: 125,
        }
    }
}

/// One edge of a route in pixel space, as `[x1, y1, x2, y2]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub uncropped: [i64; 4],
    pub cropped: [i64; 4],
}

impl CoordinateTransform {
    // x uses the height ratio and y the width ratio
    fn scale_x(&self, x: f64) -> i64 {
        (x * (self.map_height_pixels as f64 / self.map_height_feet as f64)) as i64
    }

    fn scale_y(&self, y: f64) -> i64 {
        (y * (self.map_width_pixels as f64 / self.map_width_feet as f64)) as i64
    }

    /// Pixel segments for every edge of `path`
    pub fn segments(&self, path: &Path, graph: &Graph) -> Vec<Segment> {
        path.edges()
            .iter()
            .map(|edge| {
                let src = graph.vertex(edge.src).geom;
                let dst = graph.vertex(edge.dst).geom;
                let uncropped = [
                    self.scale_x(src.x()),
                    self.scale_y(src.y()),
                    self.scale_x(dst.x()),
                    self.scale_y(dst.y()),
                ];
                let cropped = [
                    uncropped[0] - self.crop_left,
                    uncropped[1] - self.crop_down,
                    uncropped[2] - self.crop_left,
                    uncropped[3] - self.crop_down,
                ];
                Segment { uncropped, cropped }
            })
            .collect()
    }

    /// Write `uncropped.txt` and `cropped.txt` into `dir`, one `a b c d` line per edge
    pub fn write_route<P: AsRef<FsPath>>(
        &self,
        path: &Path,
        graph: &Graph,
        dir: P,
    ) -> Result<(), Error> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let mut uncropped = BufWriter::new(File::create(dir.join("uncropped.txt"))?);
        let mut cropped = BufWriter::new(File::create(dir.join("cropped.txt"))?);
        for segment in self.segments(path, graph) {
            let [a, b, c, d] = segment.uncropped;
            writeln!(uncropped, "{} {} {} {}", a, b, c, d)?;
            let [a, b, c, d] = segment.cropped;
            writeln!(cropped, "{} {} {} {}", a, b, c, d)?;
        }
        uncropped.flush()?;
        cropped.flush()?;
        log::debug!("Route written to {}", dir.display());
        Ok(())
    }
}
