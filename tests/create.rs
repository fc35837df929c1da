use cambium::{h, init, MemoryHandle, MemorySink, Patcher, Sink, VNode, VNodeData, SVG_NAMESPACE};


fn mounted(
	root_tag: &str,
	tree: VNode<MemoryHandle>,
) -> (Patcher<MemorySink>, MemoryHandle, VNode<MemoryHandle>) {
	support_::init_tracing();
	let patcher = init(Vec::new());
	let container = patcher.sink().create_element(root_tag, None);
	let tree = patcher.patch_handle(container.clone(), tree);
	(patcher, container, tree)
}

#[test]
fn splits_selectors_into_tag_id_and_classes() {
	let (_, container, _) = mounted(
		"div",
		h("div", VNodeData::new(), vec![h("p#intro.note.small", VNodeData::new(), "x")]),
	);
	assert_eq!(
		container.to_markup(),
		"<div><p class=\"note small\" id=\"intro\">x</p></div>"
	);
}

#[test]
fn materializes_children_recursively() {
	let (_, container, _) = mounted(
		"ul",
		h(
			"ul",
			VNodeData::new(),
			vec![
				h("li", VNodeData::new(), "one"),
				h("li", VNodeData::new(), vec![h("b", VNodeData::new(), "two")]),
				h("li", VNodeData::new(), ()),
			],
		),
	);
	assert_eq!(container.to_markup(), "<ul><li>one</li><li><b>two</b></li><li></li></ul>");
}

#[test]
fn materializes_comment_nodes() {
	let (_, container, _) = mounted(
		"div",
		h(
			"div",
			VNodeData::new(),
			vec![h("!", VNodeData::new(), "marker"), h("!", VNodeData::new(), ())],
		),
	);
	assert_eq!(container.to_markup(), "<div><!--marker--><!----></div>");
}

#[test]
fn materializes_untagged_nodes_as_text() {
	let (_, container, _) = mounted(
		"div",
		h(
			"div",
			VNodeData::new(),
			vec!["leading ".into(), h("em", VNodeData::new(), "mid"), 7i64.into()],
		),
	);
	assert_eq!(container.to_markup(), "<div>leading <em>mid</em>7</div>");
}

#[test]
fn creates_svg_subtrees_in_namespace() {
	let (_, container, _) = mounted(
		"div",
		h(
			"div",
			VNodeData::new(),
			vec![h(
				"svg",
				VNodeData::new(),
				vec![
					h("circle", VNodeData::new(), ()),
					h(
						"foreignObject",
						VNodeData::new(),
						vec![h("div", VNodeData::new(), "plain")],
					),
				],
			)],
		),
	);

	let svg = &container.children()[0];
	assert_eq!(svg.namespace().as_deref(), Some(SVG_NAMESPACE));
	let svg_children = svg.children();
	assert_eq!(svg_children[0].namespace().as_deref(), Some(SVG_NAMESPACE));
	assert_eq!(svg_children[1].namespace().as_deref(), Some(SVG_NAMESPACE));
	let foreign_content = &svg_children[1].children()[0];
	assert_eq!(foreign_content.namespace(), None);
}

#[test]
fn adopts_matching_raw_roots_in_place() {
	support_::init_tracing();
	let patcher = init(Vec::new());
	let sink = patcher.sink().clone();
	let container = sink.create_element("main", None);
	sink.set_attribute(&container, "id", "app");
	sink.set_attribute(&container, "class", "shell wide");
	let created_before = sink.nodes_created();

	let tree = patcher.patch_handle(container.clone(), h("main#app.shell.wide", VNodeData::new(), "hi"));

	// The adopted element is reused rather than recreated.
	assert_eq!(sink.nodes_created(), created_before);
	assert_eq!(
		container.to_markup(),
		"<main class=\"shell wide\" id=\"app\">hi</main>"
	);
	assert_eq!(tree.target.as_ref(), Some(&container));
}

#[test]
fn replaces_mismatched_raw_roots_in_their_parent() {
	support_::init_tracing();
	let patcher = init(Vec::new());
	let sink = patcher.sink().clone();
	let parent = sink.create_element("body", None);
	let before = sink.create_element("header", None);
	let container = sink.create_element("div", None);
	let after = sink.create_element("footer", None);
	sink.append_child(&parent, &before);
	sink.append_child(&parent, &container);
	sink.append_child(&parent, &after);

	let tree = patcher.patch_handle(container.clone(), h("section", VNodeData::new(), "fresh"));

	let children = parent.children();
	assert_eq!(children.len(), 3);
	assert!(children[0] == before);
	assert!(children[2] == after);
	assert_eq!(children[1].tag().as_deref(), Some("section"));
	assert_eq!(container.parent(), None);
	assert_eq!(tree.target.as_ref(), Some(&children[1]));
	assert_eq!(
		parent.to_markup(),
		"<body><header></header><section>fresh</section><footer></footer></body>"
	);
}
