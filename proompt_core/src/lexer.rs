use std::ops::Range;

use logos::Logos;

use crate::placeholder::Placeholder;
use crate::placeholder::PlaceholderKind;

/// Raw tokens produced by logos for flat tokenization of a template.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum RawToken {
	#[token("{{")]
	VariableOpen,
	#[token("}}")]
	VariableClose,
	#[token("@{")]
	SnippetOpen,
	#[regex(r"@[a-zA-Z0-9_]+")]
	SnippetWord,
	#[token("{")]
	BraceOpen,
	#[token("}")]
	BraceClose,
	#[token("@")]
	At,
	#[regex(r"[^{}@]+")]
	Text,
}

/// Context states for the walker. Each opener remembers the index of its
/// raw token so an unterminated opener can be rewound to literal text.
#[derive(Clone, Copy)]
enum ScanContext {
	/// Outside of any placeholder.
	Outside,
	/// Inside `{{`, waiting for the first `}}`.
	Variable { open: usize },
	/// Inside `@{`, waiting for the first `}`.
	Snippet { open: usize },
}

/// Tracks the line and column of a byte offset, moving forward only.
#[derive(Debug, Clone, Copy)]
struct Point {
	offset: usize,
	line: usize,
	column: usize,
}

impl Point {
	fn start() -> Self {
		Self {
			offset: 0,
			line: 1,
			column: 1,
		}
	}

	fn advance_str(&mut self, slice: &str) {
		for ch in slice.chars() {
			if ch == '\n' {
				self.line += 1;
				self.column = 1;
			} else {
				self.column += 1;
			}
		}
		self.offset += slice.len();
	}
}

/// Walks the logos token stream with context-dependent rules, collecting
/// `Placeholder` values.
struct PlaceholderWalker<'a> {
	/// The template being scanned.
	source: &'a str,
	/// The collected raw tokens and their byte spans.
	raw_tokens: Vec<(Result<RawToken, ()>, Range<usize>)>,
	/// Current index into `raw_tokens`.
	cursor: usize,
	context: ScanContext,
	/// Position of the most recently emitted placeholder.
	point: Point,
	/// Set once a `{{` is known to have no `}}` anywhere after it.
	variable_close_exhausted: bool,
	/// Set once a `@{` is known to have no `}` anywhere after it.
	snippet_close_exhausted: bool,
	placeholders: Vec<Placeholder>,
}

impl<'a> PlaceholderWalker<'a> {
	fn new(source: &'a str) -> Self {
		let raw_tokens: Vec<_> = RawToken::lexer(source).spanned().collect();

		Self {
			source,
			raw_tokens,
			cursor: 0,
			context: ScanContext::Outside,
			point: Point::start(),
			variable_close_exhausted: false,
			snippet_close_exhausted: false,
			placeholders: vec![],
		}
	}

	fn span_of(&self, index: usize) -> Range<usize> {
		self.raw_tokens[index].1.clone()
	}

	/// Emit a placeholder covering `span`. Spans arrive in increasing order so
	/// the point only ever moves forward.
	fn push_placeholder(&mut self, kind: PlaceholderKind, span: Range<usize>) {
		let gap = &self.source[self.point.offset..span.start];
		self.point.advance_str(gap);

		self.placeholders.push(Placeholder {
			kind,
			raw: self.source[span.clone()].to_string(),
			span,
			line: self.point.line,
			column: self.point.column,
		});
	}

	/// `{{ body }}` where the body is split at its first `:`.
	fn push_variable(&mut self, span: Range<usize>) {
		let body = &self.source[span.start + 2..span.end - 2];
		let (name, default) = match body.split_once(':') {
			Some((name, default)) => (name.trim(), Some(default.trim().to_string())),
			None => (body.trim(), None),
		};

		let kind = PlaceholderKind::Variable {
			name: name.to_string(),
			default,
		};
		self.push_placeholder(kind, span);
	}

	/// `@{ name }`, the span includes the closing brace.
	fn push_braced_snippet(&mut self, span: Range<usize>) {
		let name = self.source[span.start + 2..span.end - 1].trim().to_string();
		self.push_placeholder(PlaceholderKind::SnippetReference { name }, span);
	}

	/// `@name`
	fn push_word_snippet(&mut self, span: Range<usize>) {
		let name = self.source[span.start + 1..span.end].to_string();
		self.push_placeholder(PlaceholderKind::SnippetReference { name }, span);
	}

	/// Main processing loop. When the input ends inside an opener, that opener
	/// becomes literal text and walking resumes right after it.
	fn process(&mut self) {
		loop {
			self.walk();

			match self.context {
				ScanContext::Outside => break,
				ScanContext::Variable { open } => {
					self.variable_close_exhausted = true;
					self.cursor = open + 1;
				}
				ScanContext::Snippet { open } => {
					self.snippet_close_exhausted = true;
					self.cursor = open + 1;
				}
			}

			self.context = ScanContext::Outside;
		}
	}

	fn walk(&mut self) {
		while self.cursor < self.raw_tokens.len() {
			let (result, span) = &self.raw_tokens[self.cursor];
			let span = span.clone();

			// Every byte is covered by `Text` or a delimiter, so errors only
			// appear on input logos cannot split. Treat them as literal text.
			let Ok(raw) = *result else {
				self.cursor += 1;
				continue;
			};

			match self.context {
				ScanContext::Outside => {
					match raw {
						RawToken::VariableOpen if !self.variable_close_exhausted => {
							self.context = ScanContext::Variable { open: self.cursor };
						}
						RawToken::SnippetOpen if !self.snippet_close_exhausted => {
							self.context = ScanContext::Snippet { open: self.cursor };
						}
						RawToken::SnippetWord => {
							self.push_word_snippet(span);
						}
						_ => {}
					}
				}
				ScanContext::Variable { open } => {
					if raw == RawToken::VariableClose {
						let start = self.span_of(open).start;
						self.push_variable(start..span.end);
						self.context = ScanContext::Outside;
					}
				}
				ScanContext::Snippet { open } => {
					match raw {
						RawToken::BraceClose => {
							let start = self.span_of(open).start;
							self.push_braced_snippet(start..span.end);
							self.context = ScanContext::Outside;
						}
						// `@{name}}` closes on the first brace, the second one
						// stays literal.
						RawToken::VariableClose => {
							let start = self.span_of(open).start;
							self.push_braced_snippet(start..span.start + 1);
							self.context = ScanContext::Outside;
						}
						_ => {}
					}
				}
			}

			self.cursor += 1;
		}
	}
}

pub(crate) fn tokenize(source: &str) -> Vec<Placeholder> {
	let mut walker = PlaceholderWalker::new(source);
	walker.process();
	walker.placeholders
}
