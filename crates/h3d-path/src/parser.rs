//! SVG path-data parser.
//!
//! Supports `M L H V C Q S T Z` in absolute (upper case) and relative
//! (lower case) form, with implicit command repetition. Arcs (`A`/`a`) and
//! unknown commands stop the parse and mark the path incomplete, as do
//! malformed numbers and missing arguments.

use h3d_math::DVec2;

use crate::path::CurvePath;
use crate::segment::Segment;

/// Why parsing stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    MissingMoveTo,
    MissingArgument,
    UnsupportedArc,
    UnknownCommand(u8),
}

/// Cursor and pen state threaded through every command handler.
struct ParserState<'a> {
    src: &'a [u8],
    pos: usize,
    path: CurvePath,
    started: bool,
}

impl<'a> ParserState<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
            path: CurvePath::new(),
            started: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Skips whitespace and at most one comma.
    fn skip_separator(&mut self) {
        self.skip_whitespace();
        if self.peek() == Some(b',') {
            self.pos += 1;
            self.skip_whitespace();
        }
    }

    fn digits(&mut self) -> usize {
        let begin = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - begin
    }

    /// Reads `[sign] digits [. digits] [(e|E) [sign] digits]` after an
    /// optional separator. On failure the cursor is left where it was.
    fn number(&mut self) -> Option<f64> {
        let saved = self.pos;
        self.skip_separator();
        let begin = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut mantissa = self.digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            mantissa += self.digits();
        }
        if mantissa == 0 {
            self.pos = saved;
            return None;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let before_exp = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                self.pos = before_exp;
            }
        }
        let text = std::str::from_utf8(&self.src[begin..self.pos]).ok()?;
        match text.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.pos = saved;
                None
            }
        }
    }

    fn pair(&mut self) -> Option<DVec2> {
        let saved = self.pos;
        let x = self.number()?;
        match self.number() {
            Some(y) => Some(DVec2::new(x, y)),
            None => {
                self.pos = saved;
                None
            }
        }
    }

    /// Reads `N` coordinate pairs, all or nothing.
    fn pairs<const N: usize>(&mut self) -> Option<[DVec2; N]> {
        let saved = self.pos;
        let mut out = [DVec2::ZERO; N];
        for slot in &mut out {
            match self.pair() {
                Some(p) => *slot = p,
                None => {
                    self.pos = saved;
                    return None;
                }
            }
        }
        Some(out)
    }

    /// Whether another argument group follows without a command letter.
    fn continues(&mut self) -> bool {
        let saved = self.pos;
        let more = self.number().is_some();
        self.pos = saved;
        more
    }

    fn offset(&self, relative: bool) -> DVec2 {
        if relative {
            self.path.end_point()
        } else {
            DVec2::ZERO
        }
    }

    /// Control point mirrored through the pen for `S`, or the pen itself
    /// when the previous segment is not a cubic.
    fn reflected_cubic_ctrl(&self) -> DVec2 {
        let pen = self.path.end_point();
        match self.path.segments().last() {
            Some(Segment::Cubic { ctrl2, .. }) => pen * 2.0 - *ctrl2,
            _ => pen,
        }
    }

    fn reflected_quad_ctrl(&self) -> DVec2 {
        let pen = self.path.end_point();
        match self.path.segments().last() {
            Some(Segment::Quad { ctrl, .. }) => pen * 2.0 - *ctrl,
            _ => pen,
        }
    }

    /// Executes one argument group of `cmd`. `first` is false for implicit
    /// repetitions.
    fn group(&mut self, cmd: u8, first: bool) -> Result<(), Stop> {
        let relative = cmd.is_ascii_lowercase();
        let o = self.offset(relative);
        match cmd.to_ascii_uppercase() {
            b'M' => {
                let [p] = self.pairs::<1>().ok_or(Stop::MissingArgument)?;
                let p = p + o;
                if first {
                    self.path.move_to(p.x, p.y);
                    self.started = true;
                } else {
                    self.path.line_to(p.x, p.y);
                }
            }
            b'L' => {
                let [p] = self.pairs::<1>().ok_or(Stop::MissingArgument)?;
                let p = p + o;
                self.path.line_to(p.x, p.y);
            }
            b'H' => {
                let x = self.number().ok_or(Stop::MissingArgument)? + o.x;
                let y = self.path.end_point().y;
                self.path.line_to(x, y);
            }
            b'V' => {
                let y = self.number().ok_or(Stop::MissingArgument)? + o.y;
                let x = self.path.end_point().x;
                self.path.line_to(x, y);
            }
            b'C' => {
                let [c1, c2, p] = self.pairs::<3>().ok_or(Stop::MissingArgument)?;
                let (c1, c2, p) = (c1 + o, c2 + o, p + o);
                self.path.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y);
            }
            b'S' => {
                let [c2, p] = self.pairs::<2>().ok_or(Stop::MissingArgument)?;
                let c1 = self.reflected_cubic_ctrl();
                let (c2, p) = (c2 + o, p + o);
                self.path.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y);
            }
            b'Q' => {
                let [c, p] = self.pairs::<2>().ok_or(Stop::MissingArgument)?;
                let (c, p) = (c + o, p + o);
                self.path.quad_to(c.x, c.y, p.x, p.y);
            }
            b'T' => {
                let [p] = self.pairs::<1>().ok_or(Stop::MissingArgument)?;
                let c = self.reflected_quad_ctrl();
                let p = p + o;
                self.path.quad_to(c.x, c.y, p.x, p.y);
            }
            b'Z' => {
                self.path.close_path();
            }
            b'A' => return Err(Stop::UnsupportedArc),
            _ => return Err(Stop::UnknownCommand(cmd)),
        }
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), Stop> {
        if !self.started && !matches!(cmd, b'M' | b'm') {
            return Err(Stop::MissingMoveTo);
        }
        self.group(cmd, true)?;
        if matches!(cmd, b'Z' | b'z') {
            return Ok(());
        }
        while self.continues() {
            self.group(cmd, false)?;
        }
        Ok(())
    }

    fn run(&mut self) -> Result<(), Stop> {
        loop {
            self.skip_whitespace();
            let Some(cmd) = self.peek() else {
                return Ok(());
            };
            if !cmd.is_ascii_alphabetic() {
                return Err(Stop::UnknownCommand(cmd));
            }
            self.pos += 1;
            self.command(cmd)?;
        }
    }
}

/// Parse path data, keeping whatever was read before any error.
pub(crate) fn parse(data: &str) -> CurvePath {
    let mut state = ParserState::new(data);
    if let Err(stop) = state.run() {
        log::debug!("path data parse stopped at byte {}: {:?}", state.pos, stop);
        state.path.mark_incomplete();
    }
    state.path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_of(src: &str) -> (Option<f64>, usize) {
        let mut state = ParserState::new(src);
        let n = state.number();
        (n, state.pos)
    }

    #[test]
    fn test_number_scanner() {
        assert_eq!(number_of("12"), (Some(12.0), 2));
        assert_eq!(number_of(" -1.5e2"), (Some(-150.0), 7));
        assert_eq!(number_of(", .5"), (Some(0.5), 4));
        assert_eq!(number_of("3e"), (Some(3.0), 1));
        assert_eq!(number_of("1.5.5"), (Some(1.5), 3));
        assert_eq!(number_of("-"), (None, 0));
        assert_eq!(number_of(",,1"), (None, 0));
        assert_eq!(number_of("L"), (None, 0));
    }

    #[test]
    fn test_triangle() {
        let path = parse("M0,0 L10,0 L10,10 Z");
        assert!(!path.is_incomplete());
        let segs = path.segments();
        assert_eq!(segs.len(), 4);
        assert!(matches!(segs[0], Segment::Line { .. }));
        assert_eq!(segs[2], Segment::Line { from: DVec2::new(10.0, 10.0), to: DVec2::ZERO });
        assert!(segs[3].is_close());
    }

    #[test]
    fn test_relative_and_implicit_repeat() {
        let path = parse("m 1 1 2 0 0 2 h -2 v-1z");
        assert!(!path.is_incomplete());
        let ends: Vec<DVec2> = path.segments().iter().filter_map(Segment::end).collect();
        assert_eq!(
            ends,
            vec![
                DVec2::new(3.0, 1.0),
                DVec2::new(3.0, 3.0),
                DVec2::new(1.0, 3.0),
                DVec2::new(1.0, 2.0),
                DVec2::new(1.0, 1.0),
            ]
        );
        assert!(path.segments().last().unwrap().is_close());
    }

    #[test]
    fn test_smooth_cubic_reflects() {
        let path = parse("M0,0 C0,1 1,1 1,0 S2,-1 2,0");
        let Segment::Cubic { ctrl1, .. } = path.segments()[1] else {
            panic!("expected cubic");
        };
        assert_eq!(ctrl1, DVec2::new(1.0, -1.0));

        // without a preceding cubic the pen is the control point
        let path = parse("M0,0 L1,0 s1,1 1,0");
        let Segment::Cubic { ctrl1, ctrl2, to, .. } = path.segments()[1] else {
            panic!("expected cubic");
        };
        assert_eq!(ctrl1, DVec2::new(1.0, 0.0));
        assert_eq!(ctrl2, DVec2::new(2.0, 1.0));
        assert_eq!(to, DVec2::new(2.0, 0.0));
    }

    #[test]
    fn test_smooth_quad_chain() {
        let path = parse("M0,0 Q1,1 2,0 T4,0 T6,0");
        assert!(!path.is_incomplete());
        let ctrls: Vec<DVec2> = path
            .segments()
            .iter()
            .map(|s| match s {
                Segment::Quad { ctrl, .. } => *ctrl,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(ctrls, vec![DVec2::new(1.0, 1.0), DVec2::new(3.0, -1.0), DVec2::new(5.0, 1.0)]);
    }

    #[test]
    fn test_failures_keep_prefix() {
        let path = parse("M0,0 L10,0 L10");
        assert!(path.is_incomplete());
        assert_eq!(path.segments().len(), 1);

        let path = parse("M0,0 L1,1 A1,1 0 0 1 2,2 L3,3");
        assert!(path.is_incomplete());
        assert_eq!(path.segments().len(), 1);

        let path = parse("M0,0 L1,1 X");
        assert!(path.is_incomplete());
        assert_eq!(path.segments().len(), 1);

        let path = parse("L1,1");
        assert!(path.is_incomplete());
        assert!(path.is_empty());

        let path = parse("M0,0 L1,1 Z 5");
        assert!(path.is_incomplete());
        assert_eq!(path.segments().len(), 3);
    }

    #[test]
    fn test_empty_input() {
        let path = parse("   ");
        assert!(!path.is_incomplete());
        assert!(path.is_empty());
    }
}
