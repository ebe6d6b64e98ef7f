use std::collections::{HashMap, HashSet, VecDeque};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::types::GraphData;

const PALETTE: &[&str] = &[
	"#4e79a7", "#f28e2b", "#59a14f", "#e15759", "#76b7b2", "#edc948", "#b07aa1", "#ff9da7",
	"#9c755f", "#bab0ac",
];

pub const NODE_RADIUS: f64 = 6.0;
pub const HIT_RADIUS: f64 = 12.0;
const LAYER_GAP: f64 = 90.0;
const SIBLING_GAP: f64 = 60.0;
const HOVER_RATE: f64 = 6.0;

#[derive(Clone, Debug)]
pub struct NodeStyle {
	pub label: Option<String>,
	pub color: &'static str,
}

fn color_for(kind: Option<&str>) -> &'static str {
	let Some(kind) = kind else {
		return PALETTE[0];
	};
	let hash = kind
		.bytes()
		.fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
	PALETTE[hash % PALETTE.len()]
}

#[derive(Clone, Copy, Debug)]
pub struct Camera {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Camera {
	pub fn to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Zoom around a screen point so it stays put.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let k = (self.k * factor).clamp(0.1, 10.0);
		let ratio = k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = k;
	}
}

#[derive(Clone, Copy, Debug, Default)]
enum Gesture {
	#[default]
	Idle,
	Drag {
		node: DefaultNodeIdx,
		offset: (f64, f64),
	},
	Pan {
		from: (f64, f64),
		origin: (f64, f64),
	},
}

/// Hovered node and its neighbours; kept after hover ends until faded out.
#[derive(Clone, Debug, Default)]
pub struct Focus {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub fade: f64,
	active: bool,
}

pub struct GraphView {
	pub graph: ForceGraph<NodeStyle, ()>,
	pub camera: Camera,
	pub focus: Focus,
	pub width: f64,
	pub height: f64,
	gesture: Gesture,
	adjacency: HashMap<DefaultNodeIdx, Vec<DefaultNodeIdx>>,
}

/// Depth of every node in a breadth-first walk from the roots.
///
/// Roots are nodes nothing points at; nodes only reachable through cycles
/// start a new walk of their own.
fn layer_depths(data: &GraphData) -> Vec<usize> {
	let index: HashMap<&str, usize> = data
		.nodes
		.iter()
		.enumerate()
		.map(|(i, n)| (n.id.as_str(), i))
		.collect();
	let mut children = vec![Vec::new(); data.nodes.len()];
	let mut has_parent = vec![false; data.nodes.len()];
	for link in &data.links {
		if let (Some(&s), Some(&t)) = (index.get(link.source.as_str()), index.get(link.target.as_str())) {
			children[s].push(t);
			has_parent[t] = true;
		}
	}

	let mut depth = vec![usize::MAX; data.nodes.len()];
	let starts = (0..data.nodes.len())
		.filter(|&i| !has_parent[i])
		.chain(0..data.nodes.len());
	for start in starts {
		if depth[start] != usize::MAX {
			continue;
		}
		depth[start] = 0;
		let mut queue = VecDeque::from([start]);
		while let Some(i) = queue.pop_front() {
			for &c in &children[i] {
				if depth[c] == usize::MAX {
					depth[c] = depth[i] + 1;
					queue.push_back(c);
				}
			}
		}
	}
	depth
}

impl GraphView {
	pub fn new(data: &GraphData, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 120.0,
			force_spring: 0.04,
			force_max: 80.0,
			node_speed: 2500.0,
			damping_factor: 0.85,
		});

		let depths = layer_depths(data);
		let max_depth = depths.iter().copied().max().unwrap_or(0);
		let mut per_layer = vec![0usize; max_depth + 1];
		for &d in &depths {
			per_layer[d] += 1;
		}
		let mut placed = vec![0usize; max_depth + 1];

		let mut by_id = HashMap::new();
		for (node, &d) in data.nodes.iter().zip(&depths) {
			let slot = placed[d] as f64 - (per_layer[d] as f64 - 1.0) / 2.0;
			placed[d] += 1;
			let x = slot * SIBLING_GAP;
			let y = (d as f64 - max_depth as f64 / 2.0) * LAYER_GAP;
			let idx = graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeStyle {
					label: node.label.clone().or_else(|| Some(node.id.clone())),
					color: color_for(node.kind.as_deref()),
				},
			});
			by_id.insert(node.id.as_str(), idx);
		}

		let mut adjacency: HashMap<DefaultNodeIdx, Vec<DefaultNodeIdx>> = HashMap::new();
		for link in &data.links {
			let (Some(&src), Some(&tgt)) =
				(by_id.get(link.source.as_str()), by_id.get(link.target.as_str()))
			else {
				continue;
			};
			// The simulation cannot pair a node with itself.
			if src == tgt {
				continue;
			}
			graph.add_edge(src, tgt, EdgeData::default());
			adjacency.entry(src).or_default().push(tgt);
			adjacency.entry(tgt).or_default().push(src);
		}

		Self {
			graph,
			camera: Camera {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			focus: Focus::default(),
			width,
			height,
			gesture: Gesture::Idle,
			adjacency,
		}
	}

	pub fn node_at(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (wx, wy) = self.camera.to_world(sx, sy);
		let mut hit = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - wx, node.y() as f64 - wy);
			if dx.hypot(dy) < HIT_RADIUS {
				hit = Some(node.index());
			}
		});
		hit
	}

	fn position_of(&self, idx: DefaultNodeIdx) -> Option<(f64, f64)> {
		let mut pos = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				pos = Some((node.x() as f64, node.y() as f64));
			}
		});
		pos
	}

	pub fn hover(&mut self, node: Option<DefaultNodeIdx>) {
		match node {
			Some(idx) if self.focus.node == Some(idx) => self.focus.active = true,
			Some(idx) => {
				self.focus.node = Some(idx);
				self.focus.neighbors = self
					.adjacency
					.get(&idx)
					.map(|n| n.iter().copied().collect())
					.unwrap_or_default();
				self.focus.active = true;
			}
			None => self.focus.active = false,
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.focus.node == Some(idx) || self.focus.neighbors.contains(&idx)
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		self.gesture = match self.node_at(sx, sy) {
			Some(node) => {
				let (wx, wy) = self.camera.to_world(sx, sy);
				let (nx, ny) = self.position_of(node).unwrap_or((wx, wy));
				Gesture::Drag {
					node,
					offset: (nx - wx, ny - wy),
				}
			}
			None => Gesture::Pan {
				from: (sx, sy),
				origin: (self.camera.x, self.camera.y),
			},
		};
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		match self.gesture {
			Gesture::Idle => {
				let hit = self.node_at(sx, sy);
				self.hover(hit);
			}
			Gesture::Drag { node, offset } => {
				let (wx, wy) = self.camera.to_world(sx, sy);
				let (x, y) = ((wx + offset.0) as f32, (wy + offset.1) as f32);
				self.graph.visit_nodes_mut(|n| {
					if n.index() == node {
						n.data.x = x;
						n.data.y = y;
						n.data.is_anchor = true;
					}
				});
			}
			Gesture::Pan { from, origin } => {
				self.camera.x = origin.0 + (sx - from.0);
				self.camera.y = origin.1 + (sy - from.1);
			}
		}
	}

	/// Ends a drag or pan. Dragged nodes stay pinned where they were dropped.
	pub fn pointer_up(&mut self) {
		self.gesture = Gesture::Idle;
	}

	pub fn pointer_leave(&mut self) {
		self.gesture = Gesture::Idle;
		self.hover(None);
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);

		let target = if self.focus.active { 1.0 } else { 0.0 };
		let step = (HOVER_RATE * dt as f64).min(1.0);
		self.focus.fade += (target - self.focus.fade) * step;
		if !self.focus.active && self.focus.fade < 0.01 {
			self.focus = Focus::default();
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.camera.x += (width - self.width) / 2.0;
		self.camera.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}
}
