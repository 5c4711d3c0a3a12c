//! Adapter that feeds a vertex source, one sub-path at a time, through a
//! vertex generator (stroker, dasher).

use crate::basics::{PathCommand, Vertex, VertexSource};

// ============================================================================
// VertexGenerator
// ============================================================================

/// A generator accumulates one sub-path through `add_vertex` and then
/// replays its output through the [`VertexSource`] protocol.
pub trait VertexGenerator: VertexSource {
    fn remove_all(&mut self);
    fn add_vertex(&mut self, x: f64, y: f64, cmd: PathCommand);
}

impl<G: VertexGenerator + ?Sized> VertexGenerator for &mut G {
    fn remove_all(&mut self) {
        (**self).remove_all();
    }

    fn add_vertex(&mut self, x: f64, y: f64, cmd: PathCommand) {
        (**self).add_vertex(x, y, cmd);
    }
}

// ============================================================================
// ConvAdaptorVcgen
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Initial,
    Accumulate,
    Generate,
}

/// Splits the source at every `MoveTo`, hands each sub-path (including its
/// `EndPoly`/`ClosePolygon` terminator) to the generator and yields what the
/// generator produces.
pub struct ConvAdaptorVcgen<VS, G> {
    source: VS,
    generator: G,
    status: Status,
    last_cmd: PathCommand,
    start_x: f64,
    start_y: f64,
}

impl<VS: VertexSource, G: VertexGenerator> ConvAdaptorVcgen<VS, G> {
    pub fn new(source: VS, generator: G) -> Self {
        Self {
            source,
            generator,
            status: Status::Initial,
            last_cmd: PathCommand::Stop,
            start_x: 0.0,
            start_y: 0.0,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    pub fn source(&self) -> &VS {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut VS {
        &mut self.source
    }

    /// Feed the next sub-path to the generator. The `MoveTo` that ends the
    /// sub-path is remembered as the start of the following one.
    fn accumulate(&mut self) {
        self.generator.remove_all();
        self.generator
            .add_vertex(self.start_x, self.start_y, PathCommand::MoveTo);
        loop {
            let v = self.source.next_vertex();
            if v.cmd.is_vertex() {
                self.last_cmd = v.cmd;
                if v.cmd.is_move_to() {
                    self.start_x = v.x;
                    self.start_y = v.y;
                    break;
                }
                self.generator.add_vertex(v.x, v.y, v.cmd);
            } else if v.cmd.is_stop() {
                self.last_cmd = PathCommand::Stop;
                break;
            } else if v.cmd.is_end_poly() {
                self.generator.add_vertex(v.x, v.y, v.cmd);
                break;
            }
        }
        self.generator.rewind(0);
    }
}

impl<VS: VertexSource, G: VertexGenerator> VertexSource for ConvAdaptorVcgen<VS, G> {
    fn rewind(&mut self, path_id: u32) {
        self.source.rewind(path_id);
        self.status = Status::Initial;
    }

    fn next_vertex(&mut self) -> Vertex {
        loop {
            match self.status {
                Status::Initial => {
                    let v = self.source.next_vertex();
                    self.last_cmd = v.cmd;
                    self.start_x = v.x;
                    self.start_y = v.y;
                    self.status = Status::Accumulate;
                }
                Status::Accumulate => {
                    if self.last_cmd.is_stop() {
                        return Vertex::stop();
                    }
                    self.accumulate();
                    self.status = Status::Generate;
                }
                Status::Generate => {
                    let v = self.generator.next_vertex();
                    if v.cmd.is_stop() {
                        self.status = Status::Accumulate;
                        continue;
                    }
                    return v;
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
