use csv::{ReaderBuilder, StringRecord, Trim};
use std::{fs::File, io::Read, path::Path, str::FromStr, time::Instant};

use super::{
    error::Error,
    graph::{EdgeData, Graph, Vertex},
};

const DEBUG_PREFIX: &str = "[DEBUG] ";

// Flat text records describing the walkway network. Fields are separated by
// spaces; the trailing name may be quoted or span several fields.
struct VertexRecord {
    id: u32,
    label: String,
    x: f64,
    y: f64,
    name: String,
}

struct EdgeRecord {
    id: u32,
    src: u32,
    dst: u32,
    length: u32,
    angle: i32,
    direction: String,
    edge_type: char,
    name: String,
}

impl Graph {
    /// Build a graph from a vertex file and an edge file
    ///
    /// # Parameters
    /// - `vertex_path`: records of `id label x y name`
    /// - `edge_path`: records of `id label1 label2 src dst length angle direction type name`
    /// - `include_debug`: whether lines tagged `[DEBUG] ` are part of the network
    pub fn load<P, Q>(vertex_path: P, edge_path: Q, include_debug: bool) -> Result<Graph, Error>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let start = Instant::now();
        let vertex_file = format!("{}", vertex_path.as_ref().display());
        let edge_file = format!("{}", edge_path.as_ref().display());
        let graph = Graph::from_readers(
            File::open(vertex_path)?,
            &vertex_file,
            File::open(edge_path)?,
            &edge_file,
            include_debug,
        )?;
        log::debug!(
            "Graph loaded from {} and {} in {}ms",
            vertex_file,
            edge_file,
            start.elapsed().as_millis()
        );
        Ok(graph)
    }

    /// Build a graph from any pair of readers. The names are only used in errors.
    pub fn from_readers<V: Read, E: Read>(
        vertices: V,
        vertex_file: &str,
        edges: E,
        edge_file: &str,
        include_debug: bool,
    ) -> Result<Graph, Error> {
        let mut graph = Graph::new();
        for vertex in read_vertices(vertices, vertex_file, include_debug)? {
            graph.add_vertex(Vertex::new(
                vertex.id,
                &vertex.name,
                &vertex.label,
                vertex.x,
                vertex.y,
            ));
        }
        for edge in read_edges(edges, edge_file, include_debug)? {
            let src = lookup(&graph, edge.src)?;
            let dst = lookup(&graph, edge.dst)?;
            graph.add_edge(
                src,
                dst,
                EdgeData {
                    id: edge.id,
                    name: edge.name,
                    length: edge.length,
                    angle: edge.angle,
                    direction: edge.direction,
                    edge_type: edge.edge_type,
                },
            );
        }
        Ok(graph)
    }
}

fn lookup(graph: &Graph, id: u32) -> Result<Vertex, Error> {
    graph
        .vertex_by_id(id)
        .map(|index| graph.vertex(index).clone())
        .ok_or(Error::UnknownVertex(id))
}

/// Keeps the lines that carry records, paired with their 1-based line number
fn record_lines<R: Read>(mut reader: R, include_debug: bool) -> Result<Vec<(u64, String)>, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let mut lines = vec![];
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let line = match line.strip_prefix(DEBUG_PREFIX) {
            Some(rest) if include_debug => rest,
            Some(_) => continue,
            None => line,
        };
        lines.push((i as u64 + 1, line.to_string()));
    }
    Ok(lines)
}

/// Splits each kept line into whitespace separated fields, honouring quotes.
/// A record never runs past the end of its line.
fn read_records<R: Read>(
    reader: R,
    file: &str,
    include_debug: bool,
) -> Result<Vec<(u64, Vec<String>)>, Error> {
    let lines = record_lines(reader, include_debug)?;
    let mut records = Vec::with_capacity(lines.len());
    for (line_no, line) in lines {
        if line.matches('"').count() % 2 != 0 {
            return Err(Error::Parse {
                file: file.to_string(),
                line: line_no,
                reason: "unbalanced quote".to_string(),
            });
        }
        let line = line.replace('\t', " ");
        let mut rdr = ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(line.as_bytes());
        let fields = match rdr.records().next() {
            Some(result) => {
                let record: StringRecord = result?;
                record
                    .iter()
                    .filter(|f| !f.is_empty())
                    .map(|f| f.to_string())
                    .collect()
            }
            None => continue,
        };
        records.push((line_no, fields));
    }
    Ok(records)
}

struct Fields<'a> {
    file: &'a str,
    line: u64,
    fields: &'a [String],
    pos: usize,
}

impl<'a> Fields<'a> {
    fn error(&self, reason: String) -> Error {
        Error::Parse {
            file: self.file.to_string(),
            line: self.line,
            reason,
        }
    }

    fn next_str(&mut self, what: &str) -> Result<&'a str, Error> {
        let field = self
            .fields
            .get(self.pos)
            .ok_or_else(|| self.error(format!("missing {what}")))?;
        self.pos += 1;
        Ok(field)
    }

    fn next<T: FromStr>(&mut self, what: &str) -> Result<T, Error> {
        let field = self.next_str(what)?;
        field
            .parse()
            .map_err(|_| self.error(format!("cannot parse {what} from '{field}'")))
    }

    /// Everything left, joined with single spaces and stripped of quotes
    fn rest(&mut self) -> String {
        let rest = self.fields[self.pos.min(self.fields.len())..].join(" ");
        self.pos = self.fields.len();
        rest.replace('"', "").trim().to_string()
    }
}

fn read_vertices<R: Read>(
    reader: R,
    file: &str,
    include_debug: bool,
) -> Result<Vec<VertexRecord>, Error> {
    let mut vertices = vec![];
    for (line, fields) in read_records(reader, file, include_debug)? {
        let mut f = Fields {
            file,
            line,
            fields: &fields,
            pos: 0,
        };
        vertices.push(VertexRecord {
            id: f.next("vertex id")?,
            label: f.next_str("label")?.to_string(),
            x: f.next("x")?,
            y: f.next("y")?,
            name: f.rest(),
        });
    }
    Ok(vertices)
}

fn read_edges<R: Read>(reader: R, file: &str, include_debug: bool) -> Result<Vec<EdgeRecord>, Error> {
    let mut edges = vec![];
    for (line, fields) in read_records(reader, file, include_debug)? {
        let mut f = Fields {
            file,
            line,
            fields: &fields,
            pos: 0,
        };
        let id = f.next("edge id")?;
        f.next_str("first vertex label")?;
        f.next_str("second vertex label")?;
        let src = f.next("source id")?;
        let dst = f.next("destination id")?;
        let length = f.next("length")?;
        let angle = f.next("angle")?;
        let direction = f.next_str("direction")?.to_string();
        let token = f.next_str("edge type")?;
        // the code is the second character of tokens such as "(F)"
        let edge_type = match token.chars().nth(1) {
            Some('x') => 'F',
            Some(c) => c,
            None => return Err(f.error(format!("edge type token '{token}' is too short"))),
        };
        edges.push(EdgeRecord {
            id,
            src,
            dst,
            length,
            angle,
            direction,
            edge_type,
            name: f.rest(),
        });
    }
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VERTICES: &str = r#"// id label x y name
1 A 100 200 "North Gate"
2 B 300 200 Library Steps
[DEBUG] 3 C 50 50 "Debug Corner"

4 D 10 20 "Quad"
"#;

    const EDGES: &str = r#"// id l1 l2 src dst length angle dir type name
10 A B 1 2 200 90 E (F) "Main Walk"
11 B A 2 1 200 270 W (x) Main Walk
12 B D 2 4 75 180 S (s) "Stairs"
[DEBUG] 13 A C 1 3 20 0 N (f) "Debug Path"
"#;

    fn build(include_debug: bool) -> Result<Graph, Error> {
        Graph::from_readers(
            VERTICES.as_bytes(),
            "vertices.txt",
            EDGES.as_bytes(),
            "edges.txt",
            include_debug,
        )
    }

    #[test]
    fn test_parse_skips_comments_and_debug() {
        let graph = build(false).unwrap();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.vertex_by_id(3).is_none());
        let a = graph.vertex(graph.vertex_by_id(1).unwrap());
        assert_eq!(a.name, "North Gate");
        assert_eq!(a.label, "A");
        assert_eq!(a.geom.x(), 100.0);
        let b = graph.vertex(graph.vertex_by_id(2).unwrap());
        assert_eq!(b.name, "Library Steps");
    }

    #[test]
    fn test_parse_includes_debug() {
        let graph = build(true).unwrap();
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_edge_fields() {
        let graph = build(false).unwrap();
        let a = graph.vertex_by_id(1).unwrap();
        let b = graph.vertex_by_id(2).unwrap();
        let walk = graph.edge_between(a, b).unwrap();
        assert_eq!(walk.id, 10);
        assert_eq!(walk.length, 200);
        assert_eq!(walk.angle, 90);
        assert_eq!(walk.direction, "E");
        assert_eq!(walk.edge_type, 'F');
        assert_eq!(walk.name, "Main Walk");
        // 'x' is read as 'F'
        assert_eq!(graph.edge_between(b, a).unwrap().edge_type, 'F');
    }

    #[test]
    fn test_unknown_vertex() {
        let edges = "10 A Z 1 99 10 0 N (f) Nowhere\n";
        let result = Graph::from_readers(
            VERTICES.as_bytes(),
            "vertices.txt",
            edges.as_bytes(),
            "edges.txt",
            false,
        );
        assert!(matches!(result, Err(Error::UnknownVertex(99))));
    }

    #[test]
    fn test_malformed_number_names_line() {
        let vertices = "// header\n1 A ten 20 Bad\n";
        let result = Graph::from_readers(
            vertices.as_bytes(),
            "vertices.txt",
            "".as_bytes(),
            "edges.txt",
            false,
        );
        match result {
            Err(Error::Parse { file, line, .. }) => {
                assert_eq!(file, "vertices.txt");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected result: {:?}", other.map(|g| g.vertex_count())),
        }
    }

    #[test]
    fn test_unbalanced_quote_does_not_swallow_next_lines() {
        let vertices = "1 A 100 200 \"North Gate\n2 B 300 200 Library\n3 C 5 5 Quad\n";
        let result = Graph::from_readers(
            vertices.as_bytes(),
            "vertices.txt",
            "".as_bytes(),
            "edges.txt",
            false,
        );
        match result {
            Err(Error::Parse { file, line, reason }) => {
                assert_eq!(file, "vertices.txt");
                assert_eq!(line, 1);
                assert!(reason.contains("quote"));
            }
            other => panic!("unexpected result: {:?}", other.map(|g| g.vertex_count())),
        }
    }

    #[test]
    fn test_line_numbers_follow_skipped_lines() {
        let vertices = "// header\n\n1 A 0 0 \"Gate\"\n2 B zero 0 Bad\n";
        let result = Graph::from_readers(
            vertices.as_bytes(),
            "vertices.txt",
            "".as_bytes(),
            "edges.txt",
            false,
        );
        assert!(matches!(result, Err(Error::Parse { line: 4, .. })));
    }

    #[test]
    fn test_tabs_separate_fields() {
        let vertices = "1\tA\t100\t200\tNorth\n2 B\t300 200\t\"Library Steps\"\n";
        let edges = "10\tA\tB\t1\t2\t200\t90\tE\t(F)\tMain\tWalk\n";
        let graph = Graph::from_readers(
            vertices.as_bytes(),
            "vertices.txt",
            edges.as_bytes(),
            "edges.txt",
            false,
        )
        .unwrap();
        assert_eq!(graph.vertex_count(), 2);
        let a = graph.vertex_by_id(1).unwrap();
        let b = graph.vertex_by_id(2).unwrap();
        assert_eq!(graph.vertex(a).name, "North");
        assert_eq!(graph.vertex(b).name, "Library Steps");
        assert_eq!(graph.vertex(b).geom.x(), 300.0);
        let edge = graph.edge_between(a, b).unwrap();
        assert_eq!(edge.length, 200);
        assert_eq!(edge.edge_type, 'F');
        assert_eq!(edge.name, "Main Walk");
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let vpath = dir.path().join("vertices.txt");
        let epath = dir.path().join("edges.txt");
        File::create(&vpath)
            .unwrap()
            .write_all(VERTICES.as_bytes())
            .unwrap();
        File::create(&epath)
            .unwrap()
            .write_all(EDGES.as_bytes())
            .unwrap();
        let graph = Graph::load(&vpath, &epath, false).unwrap();
        assert_eq!(graph.vertex_count(), 3);
    }
}
