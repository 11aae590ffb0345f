//! Plain geometric aggregates.

use jsync_core::{Aggregate, Fields};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Aggregate for Point {
    fn declare<'a>(&'a mut self, fields: &mut Fields<'a>) {
        fields.bind("x", &mut self.x).bind("y", &mut self.y);
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

impl Line {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }
}

impl Aggregate for Line {
    fn declare<'a>(&'a mut self, fields: &mut Fields<'a>) {
        fields.bind("a", &mut self.a).bind("b", &mut self.b);
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.a, self.b)
    }
}
